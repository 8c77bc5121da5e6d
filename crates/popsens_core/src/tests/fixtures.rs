//! Two consecutive census pyramids (five years apart) of a large country.

use crate::bounds::FixedBounds;
use crate::model::{CohortState, ParameterId, SENSITIVE_TRANSITIONS, Sex, VitalRates};
use crate::rates::derive_baseline_rates;

const PREVIOUS_FEMALE: [f64; 21] = [
    4609465.0, 4024755.0, 3533982.0, 3260485.0, 3987011.0, 5958673.0, 6145860.0, 5605733.0,
    5288769.0, 4750801.0, 5382475.0, 6114708.0, 5498509.0, 4481741.0, 2180709.0, 3522448.0,
    1818669.0, 1205980.0, 365890.0, 46189.0, 6288.0,
];

const PREVIOUS_MALE: [f64; 21] = [
    4872040.0, 4232445.0, 3702589.0, 3419312.0, 4163057.0, 6125318.0, 6147438.0, 5430433.0,
    4945739.0, 4376376.0, 4634895.0, 4859152.0, 3865909.0, 2802033.0, 1149423.0, 1493858.0,
    661974.0, 357454.0, 70912.0, 8464.0, 1204.0,
];

const CURRENT_FEMALE: [f64; 21] = [
    3836611.0, 4635743.0, 4041370.0, 3591364.0, 3401107.0, 4145188.0, 6068610.0, 6198024.0,
    5610823.0, 5257968.0, 4686765.0, 5247889.0, 5866238.0, 5099956.0, 3963419.0, 1799526.0,
    2555100.0, 1065362.0, 522047.0, 108310.0, 8684.0,
];

const CURRENT_MALE: [f64; 21] = [
    4053692.0, 4896880.0, 4247345.0, 3751083.0, 3538361.0, 4290943.0, 6175349.0, 6111248.0,
    5318361.0, 4778909.0, 4155226.0, 4273108.0, 4298075.0, 3186549.0, 2151705.0, 804388.0,
    889007.0, 320190.0, 130678.0, 19652.0, 1914.0,
];

pub fn previous() -> CohortState {
    CohortState::new(&PREVIOUS_FEMALE, &PREVIOUS_MALE).unwrap()
}

pub fn current() -> CohortState {
    CohortState::new(&CURRENT_FEMALE, &CURRENT_MALE).unwrap()
}

pub fn baseline_rates() -> VitalRates {
    derive_baseline_rates(&previous(), &current()).unwrap()
}

/// Fertility ±15%, female share ±1 point, sampled survival rates ±5% around baseline
pub fn realistic_bounds() -> FixedBounds {
    let rates = baseline_rates();
    let fertility = rates.fertility();
    let share = rates.female_share();
    let mut bounds = FixedBounds::new()
        .with(ParameterId::Fertility, fertility * 0.85, fertility * 1.15)
        .with(ParameterId::FemaleShare, share - 0.01, share + 0.01);
    for sex in Sex::ALL {
        for bracket in SENSITIVE_TRANSITIONS {
            let rate = rates.survival(sex)[bracket];
            bounds.insert(
                ParameterId::Survival { sex, bracket },
                rate * 0.95,
                (rate * 1.05).min(2.0),
            );
        }
    }
    bounds
}
