use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used as part of a score's identity.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    WsRank,
    DigitalScore,
    ClimateChange,
    NaturalCapital,
    PollutionWaste,
    HumanCapital,
    ProductLiability,
    CommunityRelations,
    CorporateGovernance,
    BusinessEthics,
    Environmental,
    Social,
    Governance,
    Esg,
}

impl ScoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WsRank => "ws_rank",
            Self::DigitalScore => "digital_score",
            Self::ClimateChange => "climate_change",
            Self::NaturalCapital => "natural_capital",
            Self::PollutionWaste => "pollution_waste",
            Self::HumanCapital => "human_capital",
            Self::ProductLiability => "product_liability",
            Self::CommunityRelations => "community_relations",
            Self::CorporateGovernance => "corporate_governance",
            Self::BusinessEthics => "business_ethics",
            Self::Environmental => "environmental",
            Self::Social => "social",
            Self::Governance => "governance",
            Self::Esg => "esg",
        }
    }
}

/// An append-only score observation, unique on
/// `(entity_id, score_type, timestamp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub entity_id: i64,
    pub score_type: ScoreType,
    pub timestamp: String,
    pub value: f64,
}

impl ScoreRecord {
    pub fn new(entity_id: i64, score_type: ScoreType, at: DateTime<Utc>, value: f64) -> Self {
        Self {
            entity_id,
            score_type,
            timestamp: timestamp_key(at),
            value,
        }
    }
}

pub fn timestamp_key(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
