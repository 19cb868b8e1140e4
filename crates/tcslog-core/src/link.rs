use chrono::NaiveTime;
use tracing::info;

use crate::config::NO_EARLIER_ID;
use crate::model::CorrectionRecord;

const SECONDS_PER_DAY: i64 = 86_400;

/// Which correction foreign-key pair a linking pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAttr {
    ForceDistribution,
    Image,
}

impl LinkAttr {
    fn name(&self) -> &'static str {
        match self {
            LinkAttr::ForceDistribution => "f_dist",
            LinkAttr::Image => "img",
        }
    }
}

/// Day-boundary disambiguation for a night that crosses local midnight:
/// times at or after noon belong to the first calendar day of the night,
/// times before noon to the morning after.
pub fn night_unix_seconds(time: NaiveTime) -> i64 {
    let seconds = i64::from(chrono::Timelike::num_seconds_from_midnight(&time));
    if seconds >= SECONDS_PER_DAY / 2 {
        seconds
    } else {
        seconds + SECONDS_PER_DAY
    }
}

/// Writes each correction's bracketing neighbors from a target collection:
/// `old` is the last target strictly before the correction, `new` the first
/// target at or after it. A correction past every target links neither; one
/// before every target gets the `-1` sentinel for `old`.
pub fn link_corrections(
    corrections: &mut [CorrectionRecord],
    targets: &[(NaiveTime, i64)],
    attr: LinkAttr,
) {
    if targets.is_empty() {
        info!(attr = attr.name(), "target collection empty, no linking done");
        return;
    }

    let mut ordered: Vec<(i64, i64)> = targets
        .iter()
        .map(|(time, id)| (night_unix_seconds(*time), *id))
        .collect();
    ordered.sort_by_key(|(unix, _)| *unix);

    for correction in corrections.iter_mut() {
        let curr = night_unix_seconds(correction.timestamp);

        let mut old_id = None;
        let mut new_id = None;
        for (unix, id) in &ordered {
            if *unix < curr {
                old_id = Some(*id);
            } else {
                new_id = Some(*id);
                break;
            }
        }

        let Some(new_id) = new_id else {
            // Correction after the last target: neither side is written.
            continue;
        };
        let old_id = old_id.unwrap_or(NO_EARLIER_ID);

        match attr {
            LinkAttr::ForceDistribution => {
                correction.id_f_dist_old = Some(old_id);
                correction.id_f_dist_new = Some(new_id);
            }
            LinkAttr::Image => {
                correction.id_img_old = Some(old_id);
                correction.id_img_new = Some(new_id);
            }
        }
    }

    info!(
        attr = attr.name(),
        corrections = corrections.len(),
        targets = ordered.len(),
        "corrections linked"
    );
}
