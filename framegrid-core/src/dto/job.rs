//! Job DTOs for coordinator API communication

use serde::{Deserialize, Deserializer, Serialize};

/// Request to submit a new render job
///
/// `start`, `end` and `priority` accept either JSON integers or
/// integer-parseable strings, since submissions also arrive from HTML forms
/// that send everything as strings. Anything else is a deserialization error
/// and surfaces as a bad request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJob {
    pub project: String,
    #[serde(deserialize_with = "int_lenient")]
    pub start: i32,
    #[serde(deserialize_with = "int_lenient")]
    pub end: i32,
    #[serde(default, deserialize_with = "opt_int_lenient")]
    pub priority: Option<i32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

impl IntOrString {
    fn into_i32<E: serde::de::Error>(self) -> Result<i32, E> {
        match self {
            IntOrString::Int(v) => i32::try_from(v).map_err(E::custom),
            IntOrString::Str(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

fn int_lenient<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    IntOrString::deserialize(deserializer)?.into_i32()
}

fn opt_int_lenient<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrString>::deserialize(deserializer)? {
        Some(v) => v.into_i32().map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_integer_fields() {
        let req: SubmitJob =
            serde_json::from_str(r#"{"project":"scene","start":1,"end":5,"priority":2}"#).unwrap();
        assert_eq!(req.start, 1);
        assert_eq!(req.end, 5);
        assert_eq!(req.priority, Some(2));
    }

    #[test]
    fn test_accepts_stringly_integers() {
        let req: SubmitJob =
            serde_json::from_str(r#"{"project":"scene","start":"1","end":" 5 "}"#).unwrap();
        assert_eq!(req.start, 1);
        assert_eq!(req.end, 5);
        assert_eq!(req.priority, None);
    }

    #[test]
    fn test_rejects_non_integer_fields() {
        let res: Result<SubmitJob, _> =
            serde_json::from_str(r#"{"project":"scene","start":"one","end":5}"#);
        assert!(res.is_err());

        let res: Result<SubmitJob, _> =
            serde_json::from_str(r#"{"project":"scene","start":1.5,"end":5}"#);
        assert!(res.is_err());
    }
}
