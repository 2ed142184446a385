use serde::{Deserialize, Deserializer, Serialize};

pub fn round2(value: f64) -> f64 {
    // exact decimal expansion, ties to even
    format!("{value:.2}").parse().unwrap_or(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockItem {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
}

impl StockItem {
    pub fn new(length: u32, quantity: u32) -> Self {
        Self { length, quantity }
    }
}

impl std::fmt::Display for StockItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}mm x{}", self.length, self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DemandItem {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
}

impl DemandItem {
    pub fn new(length: u32, quantity: u32) -> Self {
        Self { length, quantity }
    }
}

impl std::fmt::Display for DemandItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}mm x{}", self.length, self.quantity)
    }
}

pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}

// combo[i] counts pieces of demand slot i; pieces_length + kerf_loss + waste == stock_length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub stock_length: u32,
    pub combo: Vec<u32>,
    pub pieces_length: u64,
    pub kerf_loss: u64,
    pub waste: u64,
    pub utilization: f64,
}

impl Pattern {
    pub fn piece_count(&self) -> u32 {
        self.combo.iter().sum()
    }

        pub fn consumption(&self) -> u64 {
        self.pieces_length + self.kerf_loss
    }

        pub fn pieces(&self, demand_lengths: &[u32]) -> Vec<PieceCount> {
        self.combo
            .iter()
            .zip(demand_lengths)
            .filter(|&(&count, _)| count > 0)
            .map(|(&count, &length)| PieceCount { length, count })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieceCount {
    pub length: u32,
    pub count: u32,
}

impl std::fmt::Display for PieceCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}mm x{}", self.length, self.count)
    }
}

pub fn describe_pieces(pieces: &[PieceCount]) -> String {
    pieces
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" + ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutRecord {
    pub serial: u32,
    pub stock_length: u32,
    pub pieces: Vec<PieceCount>,
    pub composition: String,
    pub total_consumed: u64,
    pub kerf_loss: u64,
    pub waste: u64,
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummaryRow {
    pub stock_length: u32,
    pub times_used: u32,
    pub pattern: String,
    pub total_waste: u64,
    pub total_kerf_loss: u64,
    pub average_utilization: f64,
    pub overall_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandCompletionRow {
    pub length: u32,
    pub requested: u32,
    pub produced: u64,
    pub completed: u32,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanStatistics {
    pub bars_used: u64,
    pub total_stock_length: u64,
    pub total_pieces: u64,
    pub total_finished_length: u64,
    pub overall_utilization: f64,
    pub max_waste: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuttingPlan {
    pub status: crate::solver::SolveStatus,
    pub cuts: Vec<CutRecord>,
    pub summary: Vec<PlanSummaryRow>,
    pub demand_completion: Vec<DemandCompletionRow>,
    pub statistics: PlanStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "deserialize_u32_from_number")]
        value: u32,
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(82.2500001), 82.25);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(75.125), 75.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn test_deserialize_accepts_integral_float() {
        let w: Wrapper = serde_json::from_str(r#"{"value": 5.0}"#).unwrap();
        assert_eq!(w.value, 5);
        let w: Wrapper = serde_json::from_str(r#"{"value": 6000}"#).unwrap();
        assert_eq!(w.value, 6000);
    }

    #[test]
    fn test_deserialize_rejects_fraction_and_negative() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"value": 2.5}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"value": -1}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"value": "7"}"#).is_err());
    }

    #[test]
    fn test_pattern_pieces_skip_zero_slots() {
        let pattern = Pattern {
            stock_length: 6000,
            combo: vec![2, 0, 1],
            pieces_length: 5940,
            kerf_loss: 10,
            waste: 50,
            utilization: 99.17,
        };
        let pieces = pattern.pieces(&[2465, 1000, 1010]);
        assert_eq!(
            pieces,
            vec![
                PieceCount { length: 2465, count: 2 },
                PieceCount { length: 1010, count: 1 },
            ]
        );
        assert_eq!(describe_pieces(&pieces), "2465mm x2 + 1010mm x1");
        assert_eq!(pattern.piece_count(), 3);
    }
}
