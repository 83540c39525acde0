//! Per-conversation progress through the location hierarchy.

use serde::{Deserialize, Serialize};

/// How far a conversation has progressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Idle,
    RegionChosen,
    ProvinceChosen,
    /// Stays here for follow-up questions until a reset.
    DistrictChosen,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Idle => "idle",
            Step::RegionChosen => "region_chosen",
            Step::ProvinceChosen => "province_chosen",
            Step::DistrictChosen => "district_chosen",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Conversation state. Fields are only changed through the selection
/// methods, which keep `district ⇒ province ⇒ region`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    step: Step,
    region: Option<String>,
    province: Option<String>,
    district: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn province(&self) -> Option<&str> {
        self.province.as_deref()
    }

    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    /// Choose a region, discarding any province and district.
    pub fn select_region(&mut self, region: impl Into<String>) {
        self.region = Some(region.into());
        self.province = None;
        self.district = None;
        self.step = Step::RegionChosen;
    }

    /// Choose a province within the current region, discarding any district.
    ///
    /// Ignored when no region is chosen.
    pub fn select_province(&mut self, province: impl Into<String>) {
        if self.region.is_none() {
            return;
        }
        self.province = Some(province.into());
        self.district = None;
        self.step = Step::ProvinceChosen;
    }

    /// Choose a district within the current province.
    ///
    /// Ignored when no province is chosen.
    pub fn select_district(&mut self, district: impl Into<String>) {
        if self.province.is_none() {
            return;
        }
        self.district = Some(district.into());
        self.step = Step::DistrictChosen;
    }

    /// Back to `Idle` with every field cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `district ⇒ province ⇒ region`, and the step agrees with the fields.
    pub fn is_consistent(&self) -> bool {
        let chain = (self.district.is_none() || self.province.is_some())
            && (self.province.is_none() || self.region.is_some());
        let step_matches = match self.step {
            Step::Idle => self.region.is_none(),
            Step::RegionChosen => self.region.is_some() && self.province.is_none(),
            Step::ProvinceChosen => self.province.is_some() && self.district.is_none(),
            Step::DistrictChosen => self.district.is_some(),
        };
        chain && step_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let state = ConversationState::new();
        assert_eq!(state.step(), Step::Idle);
        assert!(state.region().is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_changing_region_clears_later_fields() {
        let mut state = ConversationState::new();
        state.select_region("Northern");
        state.select_province("Chiang Mai");
        state.select_district("Mae Rim");
        assert_eq!(state.step(), Step::DistrictChosen);

        state.select_region("Southern");
        assert_eq!(state.step(), Step::RegionChosen);
        assert_eq!(state.region(), Some("Southern"));
        assert!(state.province().is_none());
        assert!(state.district().is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_out_of_order_selection_is_ignored() {
        let mut state = ConversationState::new();
        state.select_district("Mae Rim");
        state.select_province("Chiang Mai");
        assert_eq!(state, ConversationState::new());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = ConversationState::new();
        state.select_region("Northern");
        state.select_province("Chiang Mai");
        state.reset();
        assert_eq!(state, ConversationState::new());
    }
}
