use serde::Serialize;
use serde_json::{json, Value};

pub const SUCCESS_STATUS: u16 = 200;

/// Lambda response: a status code and a body carrying a short message plus
/// whatever the job wants to report.
pub fn success<T: Serialize>(message: &str, report: &T) -> Result<Value, serde_json::Error> {
    Ok(json!({
        "statusCode": SUCCESS_STATUS,
        "body": {
            "message": message,
            "report": serde_json::to_value(report)?,
        },
    }))
}
