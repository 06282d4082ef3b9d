//! Prescribing and incidence trend measures
//!
//! Monthly trends over the study period: antibiotic prescribing volumes,
//! tendinitis incidence, and tendinitis diagnoses preceded by an
//! amoxicillin dispensing in the prior 30 days, all denominated by patients
//! continuously registered through each month.

use crate::algorithm::measures::{
    Denominator, EventStream, IntervalPartition, Measure, MeasureQuantity, Measures, Numerator,
};
use crate::algorithm::window::{Offset, TimeWindow};
use crate::codelist::CodeListRegistry;
use crate::config::StudyConfig;
use crate::error::Result;
use crate::study::codelists::keys;

/// Number of monthly intervals the trends cover
pub const TREND_INTERVAL_MONTHS: u32 = 120;

/// Build the study's trend measures
pub fn trend_measures(registry: &CodeListRegistry, config: &StudyConfig) -> Result<Measures> {
    let partition = IntervalPartition::monthly(config.study_start, TREND_INTERVAL_MONTHS)?;
    let mut measures = Measures::new(partition);

    measures.define_measure(Measure {
        name: "fluoroquinolone_trends".to_string(),
        numerator: Numerator::EventsInInterval {
            stream: EventStream::Medication,
            codelist: registry.get(keys::FLUOROQUINOLONES)?,
            quantity: MeasureQuantity::Count,
        },
        denominator: Denominator::RegisteredThroughInterval,
    });

    measures.define_measure(Measure {
        name: "amoxicillin_trends".to_string(),
        numerator: Numerator::EventsInInterval {
            stream: EventStream::Medication,
            codelist: registry.get(keys::AMOXICILLIN)?,
            quantity: MeasureQuantity::Count,
        },
        denominator: Denominator::RegisteredThroughInterval,
    });

    // Repeat coding of the same diagnosis should not inflate the trend, so
    // existence rather than count
    measures.define_measure(Measure {
        name: "tendinitis_trends".to_string(),
        numerator: Numerator::EventsInInterval {
            stream: EventStream::Clinical,
            codelist: registry.get(keys::TENDINITIS)?,
            quantity: MeasureQuantity::Exists,
        },
        denominator: Denominator::RegisteredThroughInterval,
    });

    measures.define_measure(Measure {
        name: "tendinitis_prevamox_trends".to_string(),
        numerator: Numerator::ExposurePrecedingFirstEvent {
            outcome: registry.get(keys::TENDINITIS)?,
            exposure: registry.get(keys::AMOXICILLIN)?,
            window: TimeWindow::new(Offset::days(30), Offset::days(1))?,
        },
        denominator: Denominator::RegisteredThroughInterval,
    });

    Ok(measures)
}
