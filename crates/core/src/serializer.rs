use serde_json::{json, Map, Value};

use crate::types::{Course, Entity};

/// Converts a successful domain value into the plain JSON shape sent to clients.
pub fn to_primitive(entity: &Entity) -> Value {
    match entity {
        Entity::User(user) => json!({ "id": user.id, "email": user.email }),
        Entity::Course(course) => course_primitive(course),
        Entity::Enrollment(enrollment) => json!({
            "user_id": enrollment.user_id,
            "course_id": enrollment.course_id,
        }),
        Entity::List(entities) => Value::Array(entities.iter().map(to_primitive).collect()),
    }
}

fn course_primitive(course: &Course) -> Value {
    let mut object = Map::new();
    object.insert("id".to_string(), Value::from(course.id));
    object.insert("name".to_string(), Value::from(course.name.as_str()));
    // only present when the producing query aggregated enrollments
    if let Some(count) = course.enrollments_count {
        object.insert("enrollments".to_string(), Value::from(count));
    }
    Value::Object(object)
}
