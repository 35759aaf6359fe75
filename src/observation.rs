//! Observation caption generation: short, varied phrases per distance bucket.
//!
//! Content constraint: the pools contain no numbers and no clinical or
//! psychological vocabulary — gentle everyday phrasing only. Output is
//! intentionally non-deterministic across calls; callers must not assume
//! idempotence.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::DistanceBucket;

const NEAR_TEMPLATES: [&str; 6] = [
    "最近、目にすることが多かった",
    "考えが残りやすい",
    "無言でも違和感はない",
    "距離が近い",
    "存在感がある",
    "気楽な関係",
];

const MID_TEMPLATES: [&str; 6] = [
    "反応は少なめ",
    "でも存在感はある",
    "距離は安定している",
    "日常の接点がある",
    "特に変化はない",
    "穏やかな関係",
];

const FAR_TEMPLATES: [&str; 6] = [
    "会話は生まれていない",
    "少し気を使う",
    "距離がある",
    "関わりは薄め",
    "未整理の関係",
    "存在は感じる",
];

/// The fixed phrase pool for a bucket.
pub fn templates(distance: DistanceBucket) -> &'static [&'static str] {
    match distance {
        DistanceBucket::Near => &NEAR_TEMPLATES,
        DistanceBucket::Mid => &MID_TEMPLATES,
        DistanceBucket::Far => &FAR_TEMPLATES,
    }
}

/// Generate a caption for one node: 2 or 3 distinct phrases from the
/// bucket's pool, joined and terminated with a full-width period.
///
/// Selection is sampling without replacement, so a phrase never repeats
/// within one caption.
pub fn generate<R: Rng>(distance: DistanceBucket, rng: &mut R) -> String {
    let pool = templates(distance);
    let count = rng.gen_range(2..=3usize);
    let selected: Vec<&str> = pool.choose_multiple(rng, count).copied().collect();
    let mut text = selected.join("。");
    text.push('。');
    text
}
