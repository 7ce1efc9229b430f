use rand::Rng;
use rand::RngCore;

const SURNAMES: &[&str] = &[
    "Bai", "Chen", "Gu", "Han", "Lin", "Lu", "Mo", "Qin", "Shen", "Su", "Wei", "Xiao", "Ye",
    "Yun", "Zhao",
];

const GIVEN_SYLLABLES: &[&str] = &[
    "Chen", "Feng", "Hao", "Jian", "Lan", "Long", "Ming", "Qing", "Rou", "Tian", "Xue", "Yan",
    "Yu", "Yue", "Zhen",
];

/// Random cultivator name: surname plus a one- or two-syllable given name.
pub fn generate_cultivator_name(rng: &mut dyn RngCore) -> String {
    let surname = SURNAMES[rng.random_range(0..SURNAMES.len())];
    let first = GIVEN_SYLLABLES[rng.random_range(0..GIVEN_SYLLABLES.len())];
    if rng.random_bool(0.4) {
        let second = GIVEN_SYLLABLES[rng.random_range(0..GIVEN_SYLLABLES.len())].to_lowercase();
        format!("{surname} {first}{second}")
    } else {
        format!("{surname} {first}")
    }
}
