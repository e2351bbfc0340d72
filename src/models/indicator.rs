use serde::{Deserialize, Serialize};

/// A weighted performance metric. `weight` is the percentage-point
/// contribution to the compensation total; `max_value` is the value that
/// counts as 100% achievement and must stay positive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceIndicator {
    pub id: String,
    pub name: String,
    pub description: String,
    pub weight: i32,
    pub max_value: f64,
    pub category: IndicatorCategory,
    pub display_order: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorCategory {
    Courses,
    Tickets,
    Certifications,
    Activities,
    Evaluation,
}

impl IndicatorCategory {
    pub fn as_str(&self) -> &str {
        match self {
            IndicatorCategory::Courses => "courses",
            IndicatorCategory::Tickets => "tickets",
            IndicatorCategory::Certifications => "certifications",
            IndicatorCategory::Activities => "activities",
            IndicatorCategory::Evaluation => "evaluation",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "courses" => Ok(IndicatorCategory::Courses),
            "tickets" => Ok(IndicatorCategory::Tickets),
            "certifications" => Ok(IndicatorCategory::Certifications),
            "activities" => Ok(IndicatorCategory::Activities),
            "evaluation" => Ok(IndicatorCategory::Evaluation),
            _ => Err(format!("Invalid indicator category: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorCreateInput {
    pub name: String,
    pub description: Option<String>,
    pub weight: i32,
    pub max_value: f64,
    pub category: IndicatorCategory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndicatorUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub weight: Option<i32>,
    pub max_value: Option<f64>,
    pub category: Option<IndicatorCategory>,
}

impl IndicatorUpdateInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.weight.is_none()
            && self.max_value.is_none()
            && self.category.is_none()
    }
}

/// Standing summary of the configured weights. Imbalance is reportable
/// data for the configuration surface, never an error.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightSummary {
    pub total_weight: i32,
    pub balanced: bool,
}
