use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobStatus {
    Scheduled,
    Inspected,
    #[serde(rename = "Report Sent")]
    ReportSent,
    Approved,
    Assigned,
    #[serde(rename = "In Progress")]
    InProgress,
    Complete,
    Paid,
}

impl JobStatus {
    /// Declared lifecycle order.
    pub const ALL: [JobStatus; 8] = [
        JobStatus::Scheduled,
        JobStatus::Inspected,
        JobStatus::ReportSent,
        JobStatus::Approved,
        JobStatus::Assigned,
        JobStatus::InProgress,
        JobStatus::Complete,
        JobStatus::Paid,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Scheduled => "Scheduled",
            JobStatus::Inspected => "Inspected",
            JobStatus::ReportSent => "Report Sent",
            JobStatus::Approved => "Approved",
            JobStatus::Assigned => "Assigned",
            JobStatus::InProgress => "In Progress",
            JobStatus::Complete => "Complete",
            JobStatus::Paid => "Paid",
        }
    }

    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<JobStatus> {
        JobStatus::ALL.get(self.rank() + 1).copied()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// One line of a repair estimate. `margin` is always
/// `estimated_cost - contractor_price`; it can only change through the
/// pricing setters.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "RepairItemRecord")]
pub struct RepairItem {
    pub id: String,
    pub task: String,
    pub description: String,
    #[serde(rename = "estimatedCost")]
    estimated_cost: BigDecimal,
    #[serde(rename = "contractorPrice")]
    contractor_price: BigDecimal,
    margin: BigDecimal,
    pub category: String,
}

// Wire shape of a repair item; any supplied margin is discarded.
#[derive(Deserialize)]
struct RepairItemRecord {
    id: String,
    task: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "estimatedCost")]
    estimated_cost: BigDecimal,
    #[serde(rename = "contractorPrice")]
    contractor_price: BigDecimal,
    #[serde(default)]
    category: String,
}

impl From<RepairItemRecord> for RepairItem {
    fn from(record: RepairItemRecord) -> Self {
        RepairItem::new(
            record.id,
            record.task,
            record.description,
            record.estimated_cost,
            record.contractor_price,
            record.category,
        )
    }
}

impl RepairItem {
    pub fn new(
        id: impl Into<String>,
        task: impl Into<String>,
        description: impl Into<String>,
        estimated_cost: BigDecimal,
        contractor_price: BigDecimal,
        category: impl Into<String>,
    ) -> Self {
        let margin = &estimated_cost - &contractor_price;
        RepairItem {
            id: id.into(),
            task: task.into(),
            description: description.into(),
            estimated_cost,
            contractor_price,
            margin,
            category: category.into(),
        }
    }

    pub fn estimated_cost(&self) -> &BigDecimal {
        &self.estimated_cost
    }

    pub fn contractor_price(&self) -> &BigDecimal {
        &self.contractor_price
    }

    pub fn margin(&self) -> &BigDecimal {
        &self.margin
    }

    pub fn set_estimated_cost(&mut self, estimated_cost: BigDecimal) {
        self.estimated_cost = estimated_cost;
        self.recompute_margin();
    }

    pub fn set_contractor_price(&mut self, contractor_price: BigDecimal) {
        self.contractor_price = contractor_price;
        self.recompute_margin();
    }

    pub fn reprice(&mut self, estimated_cost: BigDecimal, contractor_price: BigDecimal) {
        self.estimated_cost = estimated_cost;
        self.contractor_price = contractor_price;
        self.recompute_margin();
    }

    fn recompute_margin(&mut self) {
        self.margin = &self.estimated_cost - &self.contractor_price;
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Inspection {
    pub id: String,
    pub address: String,
    #[serde(rename = "pmName")]
    pub pm_name: String,
    /// User id of the property manager who created the inspection, when known.
    #[serde(rename = "pmId", skip_serializing_if = "Option::is_none")]
    pub pm_id: Option<String>,
    pub date: NaiveDate,
    pub status: JobStatus,
    #[serde(rename = "inspectionFee")]
    pub inspection_fee: BigDecimal,
    #[serde(default)]
    pub repairs: Vec<RepairItem>,
    #[serde(rename = "contractorId", skip_serializing_if = "Option::is_none")]
    pub contractor_id: Option<String>,
    #[serde(rename = "completionDate", skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<NaiveDate>,
}

impl Inspection {
    pub fn repair(&self, repair_id: &str) -> Option<&RepairItem> {
        self.repairs.iter().find(|r| r.id == repair_id)
    }

    pub fn repair_mut(&mut self, repair_id: &str) -> Option<&mut RepairItem> {
        self.repairs.iter_mut().find(|r| r.id == repair_id)
    }

    pub fn total_estimated_cost(&self) -> BigDecimal {
        self.repairs.iter().map(|r| r.estimated_cost()).sum()
    }

    pub fn total_contractor_price(&self) -> BigDecimal {
        self.repairs.iter().map(|r| r.contractor_price()).sum()
    }

    pub fn total_margin(&self) -> BigDecimal {
        self.repairs.iter().map(|r| r.margin()).sum()
    }

    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.contractor_id.as_deref() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint() -> RepairItem {
        RepairItem::new(
            "r1",
            "Living Room Repaint",
            "Match existing eggshell white",
            BigDecimal::from(450),
            BigDecimal::from(380),
            "Painting",
        )
    }

    #[test]
    fn lifecycle_order_and_next() {
        assert_eq!(JobStatus::Scheduled.next(), Some(JobStatus::Inspected));
        assert_eq!(JobStatus::Assigned.next(), Some(JobStatus::InProgress));
        assert_eq!(JobStatus::Paid.next(), None);
        assert!(JobStatus::ReportSent < JobStatus::Approved);
        for (rank, status) in JobStatus::ALL.iter().enumerate() {
            assert_eq!(status.rank(), rank);
        }
    }

    #[test]
    fn status_labels_round_trip_through_json() {
        let json = serde_json::to_string(&JobStatus::ReportSent).unwrap();
        assert_eq!(json, "\"Report Sent\"");
        let parsed: JobStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, JobStatus::InProgress);
    }

    #[test]
    fn margin_is_computed_on_construction() {
        assert_eq!(paint().margin(), &BigDecimal::from(70));
    }

    #[test]
    fn margin_follows_every_price_change() {
        let mut item = paint();

        item.set_estimated_cost(BigDecimal::from(500));
        assert_eq!(item.margin(), &(item.estimated_cost() - item.contractor_price()));
        assert_eq!(item.margin(), &BigDecimal::from(120));

        item.set_contractor_price(BigDecimal::from(520));
        assert_eq!(item.margin(), &BigDecimal::from(-20));

        item.reprice(BigDecimal::from(300), BigDecimal::from(250));
        assert_eq!(item.margin(), &BigDecimal::from(50));
    }

    #[test]
    fn supplied_margin_is_ignored_when_deserializing() {
        let item: RepairItem = serde_json::from_value(serde_json::json!({
            "id": "r2",
            "task": "Patch drywall",
            "estimatedCost": "200",
            "contractorPrice": "150",
            "margin": "999",
            "category": "Drywall"
        }))
        .unwrap();

        assert_eq!(item.margin(), &BigDecimal::from(50));
    }

    #[test]
    fn totals_sum_over_repairs() {
        let mut second = paint();
        second.id = "r2".to_string();
        second.reprice(BigDecimal::from(100), BigDecimal::from(60));

        let inspection = Inspection {
            id: "7".to_string(),
            address: "1 Main St".to_string(),
            pm_name: "Marge Simpson".to_string(),
            pm_id: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status: JobStatus::Scheduled,
            inspection_fee: BigDecimal::from(149),
            repairs: vec![paint(), second],
            contractor_id: None,
            completion_date: None,
        };

        assert_eq!(inspection.total_estimated_cost(), BigDecimal::from(550));
        assert_eq!(inspection.total_contractor_price(), BigDecimal::from(440));
        assert_eq!(inspection.total_margin(), BigDecimal::from(110));
        assert!(inspection.repair("r2").is_some());
    }
}
