//! The guided-query state machine.

use super::commands::{Command, CommandKeywords};
use super::date::DateLiteral;
use super::render;
use super::state::{ConversationState, Step};
use crate::catalog::LocationLevel;
use crate::classifier::ThresholdClassifier;
use crate::error::StoreError;
use crate::metrics::MetricStore;
use crate::report::DistrictReport;
use crate::resolver::EntityResolver;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// Result of one message: the reply and the state to commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub response: String,
    pub state: ConversationState,
    /// Present when the reply carries district readings.
    pub report: Option<DistrictReport>,
}

impl Turn {
    fn reply(response: impl Into<String>, state: ConversationState) -> Self {
        Self {
            response: response.into(),
            state,
            report: None,
        }
    }
}

/// Parsed pieces of an inbound message.
struct Message {
    fragment: String,
    literal: Option<DateLiteral>,
}

impl Message {
    fn parse(text: &str) -> Self {
        let literal = DateLiteral::find(text);
        let fragment = match &literal {
            Some(literal) => literal.strip_from(text),
            None => text.split_whitespace().collect::<Vec<_>>().join(" "),
        };
        Self { fragment, literal }
    }

    fn date_or(&self, today: NaiveDate) -> NaiveDate {
        self.literal
            .as_ref()
            .map(|l| l.date_or(today))
            .unwrap_or(today)
    }
}

/// Drives one conversation step at a time.
///
/// [`DialogEngine::respond`] never mutates the state it is given: it returns
/// the next state inside a [`Turn`], so a failed lookup leaves the caller's
/// state untouched.
#[derive(Clone)]
pub struct DialogEngine {
    resolver: EntityResolver,
    metrics: Arc<dyn MetricStore>,
    classifier: ThresholdClassifier,
    keywords: CommandKeywords,
}

impl DialogEngine {
    pub fn new(
        resolver: EntityResolver,
        metrics: Arc<dyn MetricStore>,
        classifier: ThresholdClassifier,
        keywords: CommandKeywords,
    ) -> Self {
        Self {
            resolver,
            metrics,
            classifier,
            keywords,
        }
    }

    pub fn keywords(&self) -> &CommandKeywords {
        &self.keywords
    }

    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    pub fn metrics(&self) -> &Arc<dyn MetricStore> {
        &self.metrics
    }

    pub fn classifier(&self) -> &ThresholdClassifier {
        &self.classifier
    }

    /// Process one message against `state`, using `today` when the message
    /// carries no usable date.
    pub fn respond(
        &self,
        state: &ConversationState,
        text: &str,
        today: NaiveDate,
    ) -> Result<Turn, StoreError> {
        match self.keywords.detect(text) {
            Some(Command::Reset) => {
                debug!(from = %state.step(), "conversation reset");
                return Ok(Turn::reply(render::RESET_GUIDANCE, ConversationState::new()));
            }
            Some(Command::Help) => {
                return Ok(Turn::reply(render::usage(&self.keywords), state.clone()));
            }
            None => {}
        }

        let message = Message::parse(text);
        match state.step() {
            Step::Idle => self.choose_region(state, &message),
            Step::RegionChosen => self.choose_province(state, &message),
            Step::ProvinceChosen => self.choose_district(state, &message, today),
            Step::DistrictChosen => self.follow_up(state, &message, today),
        }
    }

    fn choose_region(
        &self,
        state: &ConversationState,
        message: &Message,
    ) -> Result<Turn, StoreError> {
        let Some(region) = self
            .resolver
            .resolve(LocationLevel::Region, &message.fragment, None)?
        else {
            let options = self.resolver.children(LocationLevel::Region, None)?;
            let text = render::not_found(LocationLevel::Region, &message.fragment, None, &options);
            return Ok(Turn::reply(text, state.clone()));
        };

        let provinces = self
            .resolver
            .children(LocationLevel::Province, Some(&region.name))?;
        let mut next = state.clone();
        next.select_region(&region.name);
        debug!(region = %region.name, "region chosen");
        Ok(Turn::reply(render::region_chosen(&region.name, &provinces), next))
    }

    fn choose_province(
        &self,
        state: &ConversationState,
        message: &Message,
    ) -> Result<Turn, StoreError> {
        let Some(region) = state.region() else {
            return self.choose_region(&ConversationState::new(), message);
        };

        let Some(province) =
            self.resolver
                .resolve(LocationLevel::Province, &message.fragment, Some(region))?
        else {
            let options = self.resolver.children(LocationLevel::Province, Some(region))?;
            let text = render::not_found(
                LocationLevel::Province,
                &message.fragment,
                Some(region),
                &options,
            );
            return Ok(Turn::reply(text, state.clone()));
        };

        let districts = self
            .resolver
            .children(LocationLevel::District, Some(&province.name))?;
        let mut next = state.clone();
        next.select_province(&province.name);
        debug!(province = %province.name, "province chosen");
        Ok(Turn::reply(render::province_chosen(&province.name, &districts), next))
    }

    fn choose_district(
        &self,
        state: &ConversationState,
        message: &Message,
        today: NaiveDate,
    ) -> Result<Turn, StoreError> {
        let Some(province) = state.province() else {
            return self.choose_province(state, message);
        };

        let Some(district) =
            self.resolver
                .resolve(LocationLevel::District, &message.fragment, Some(province))?
        else {
            let options = self.resolver.children(LocationLevel::District, Some(province))?;
            let text = render::not_found(
                LocationLevel::District,
                &message.fragment,
                Some(province),
                &options,
            );
            return Ok(Turn::reply(text, state.clone()));
        };

        let mut next = state.clone();
        next.select_district(&district.name);
        debug!(district = %district.name, "district chosen");
        self.answer(next, message.date_or(today))
    }

    fn follow_up(
        &self,
        state: &ConversationState,
        message: &Message,
        today: NaiveDate,
    ) -> Result<Turn, StoreError> {
        let (Some(province), Some(district)) = (state.province(), state.district()) else {
            return self.choose_district(state, message, today);
        };

        if let Some(other) =
            self.resolver
                .resolve(LocationLevel::District, &message.fragment, Some(province))?
        {
            let mut next = state.clone();
            next.select_district(&other.name);
            debug!(district = %other.name, "district changed");
            return self.answer(next, message.date_or(today));
        }

        if message.literal.is_some() {
            return self.answer(state.clone(), message.date_or(today));
        }

        Ok(Turn::reply(
            render::currently_viewing(district, &self.keywords),
            state.clone(),
        ))
    }

    /// Readings for the chosen district on `date`, classified and rendered.
    fn answer(&self, state: ConversationState, date: NaiveDate) -> Result<Turn, StoreError> {
        let (Some(province), Some(district)) = (state.province(), state.district()) else {
            return Ok(Turn::reply(render::RESET_GUIDANCE, ConversationState::new()));
        };

        let report = DistrictReport::build(
            self.metrics.as_ref(),
            &self.classifier,
            province,
            district,
            date,
        )?;
        match report {
            None => {
                let text = render::no_data(district, date, &self.keywords);
                Ok(Turn::reply(text, state))
            }
            Some(report) => {
                debug!(
                    district,
                    %date,
                    overall = report.overall.band.name(),
                    "district report"
                );
                let text = render::report(&report, &self.keywords);
                Ok(Turn {
                    response: text,
                    state,
                    report: Some(report),
                })
            }
        }
    }
}
