//! Wire format for the simulation service

use serde::{Deserialize, Serialize};

use crate::engine::AggregateResult;
use crate::schedule::EncounterDescription;

/// One simulation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub config: EncounterDescription,
}

/// Reply to a request: `{"result": ...}` or `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationResponse {
    Result(AggregateResult),
    Error(String),
}

impl SimulationResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, SimulationResponse::Result(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses() {
        let line = r#"{"config":{"min_time_millis":0,"max_time_millis":1000,"events":[]}}"#;
        let request: SimulationRequest = serde_json::from_str(line).unwrap();
        assert_eq!(request.config, EncounterDescription::new(0, 1000));
    }

    #[test]
    fn test_response_shape() {
        let error = serde_json::to_string(&SimulationResponse::Error("bad".into())).unwrap();
        assert_eq!(error, r#"{"error":"bad"}"#);

        let ok = SimulationResponse::Result(AggregateResult::default());
        assert!(ok.is_ok());
        assert!(serde_json::to_string(&ok).unwrap().starts_with(r#"{"result":"#));
    }
}
