//! Deterministic fallback recommendations.
//!
//! When no oracle is reachable the assistant still answers, from a canned
//! decision table keyed on the reported bottleneck and company size. This is
//! a degraded mode: the oracle-backed flow is the primary design.

use std::collections::BTreeMap;

use crate::domain::strategy::{Recommendation, StrategyRequest};

/// Produce a recommendation from the decision table. Same inputs, same
/// output, no I/O.
pub fn recommend(request: &StrategyRequest) -> Recommendation {
    let mut system = "Custom Integration Protocol";
    let mut hours_saved = "10-15";
    let mut timeline = "2-3 weeks".to_string();
    let diagnosis = match request.bottleneck.as_str() {
        "data-entry" => {
            system = "Autonomous Data Pipeline (n8n + Python)";
            hours_saved = "20+";
            "Manual data entry is consuming skilled hours on work a pipeline can own end to end."
        }
        "sales" => {
            system = "Automated Lead Qualification & CRM Sync";
            hours_saved = "15-20";
            "Deals stall in hand-offs; qualification and CRM updates are the slowest links."
        }
        "support" => {
            system = "Tier-1 AI Support Agent";
            hours_saved = "25+";
            timeline = "3-4 weeks".to_string();
            "Tier-1 volume is crowding out the support work that actually needs a human."
        }
        "reporting" => {
            system = "Real-time BI Dashboard & Aggregation";
            hours_saved = "5-10";
            timeline = "1-2 weeks".to_string();
            "Reporting is assembled by hand from sources that can feed a live dashboard."
        }
        _ => "Fragmented tooling is forcing manual copy work between systems.",
    };

    if request.company_size == "200+" {
        timeline = "4-6 weeks (Enterprise Rollout)".to_string();
    }

    let mut plan = BTreeMap::new();
    plan.insert("week1".to_string(), "Process audit and system design".to_string());
    plan.insert("week2".to_string(), "Core automation build".to_string());
    plan.insert("week3".to_string(), "Integration with your existing tools".to_string());
    plan.insert("week4".to_string(), "Testing, launch, and handover".to_string());

    Recommendation {
        diagnosis: Some(diagnosis.to_string()),
        system: Some(system.to_string()),
        hours_saved: Some(hours_saved.to_string()),
        timeline: Some(timeline),
        plan: Some(plan),
        next_step: Some(
            "Book an implementation strategy call to turn this plan into a delivery schedule."
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(bottleneck: &str, company_size: &str) -> StrategyRequest {
        StrategyRequest {
            company_size: company_size.to_string(),
            bottleneck: bottleneck.to_string(),
            ..StrategyRequest::default()
        }
    }

    #[test]
    fn support_bottleneck_selects_the_support_agent_system() {
        let recommendation = recommend(&request("support", "10-50"));

        assert_eq!(recommendation.system.as_deref(), Some("Tier-1 AI Support Agent"));
        assert_eq!(recommendation.hours_saved.as_deref(), Some("25+"));
        assert_eq!(recommendation.timeline.as_deref(), Some("3-4 weeks"));
    }

    #[test]
    fn unknown_bottleneck_falls_back_to_the_generic_integration_system() {
        let recommendation = recommend(&request("fragmentation", "1-10"));

        assert_eq!(recommendation.system.as_deref(), Some("Custom Integration Protocol"));
        assert_eq!(recommendation.hours_saved.as_deref(), Some("10-15"));
    }

    #[test]
    fn enterprise_size_extends_the_timeline() {
        let recommendation = recommend(&request("reporting", "200+"));

        assert_eq!(recommendation.timeline.as_deref(), Some("4-6 weeks (Enterprise Rollout)"));
    }

    #[test]
    fn every_field_is_filled() {
        let recommendation = recommend(&request("data-entry", "50-200"));

        assert!(recommendation.diagnosis.is_some());
        assert!(recommendation.system.is_some());
        assert!(recommendation.hours_saved.is_some());
        assert!(recommendation.timeline.is_some());
        assert_eq!(recommendation.plan.as_ref().map(BTreeMap::len), Some(4));
        assert!(recommendation.next_step.is_some());
    }

    #[test]
    fn same_inputs_same_output() {
        let input = request("sales", "10-50");
        assert_eq!(recommend(&input), recommend(&input));
    }
}
