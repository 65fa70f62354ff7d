//! MicroProfile component compatibility table.
//!
//! Each row records the component version shipped at MicroProfile levels 1..=4.
//! Versions are compared as plain strings, which is only correct while every
//! recorded version is `d.d`.

use crate::feature_name::parse_feature_name;

/// Short-name prefix shared by every MicroProfile component.
pub const MP_PREFIX: &str = "mp";

/// Number of level columns in [`MP_COMPONENTS`].
pub const MP_LEVELS: usize = 4;

/// One row of the compatibility table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MpComponent {
    pub name: &'static str,
    /// `levels[0]` is MicroProfile 1, `levels[3]` is MicroProfile 4.
    pub levels: [&'static str; MP_LEVELS],
}

pub static MP_COMPONENTS: &[MpComponent] = &[
    MpComponent { name: "mpconfig", levels: ["1.3", "1.3", "1.4", "2.0"] },
    MpComponent { name: "mpfaulttolerance", levels: ["1.1", "2.0", "2.1", "3.0"] },
    MpComponent { name: "mphealth", levels: ["1.0", "1.0", "2.2", "3.0"] },
    MpComponent { name: "mpjwt", levels: ["1.1", "1.1", "1.1", "1.2"] },
    MpComponent { name: "mpmetrics", levels: ["1.1", "1.1", "2.3", "3.0"] },
    MpComponent { name: "mpopenapi", levels: ["1.0", "1.1", "1.1", "2.0"] },
    MpComponent { name: "mpopentracing", levels: ["1.1", "1.3", "1.3", "2.0"] },
    MpComponent { name: "mprestclient", levels: ["1.1", "1.2", "1.4", "2.0"] },
];

/// Row for a lower-cased component short name.
pub fn mp_component(name: &str) -> Option<&'static MpComponent> {
    MP_COMPONENTS.iter().find(|c| c.name == name)
}

/// Lowest MicroProfile level that satisfies `feature_id` (e.g. `mpconfig-1.4`).
///
/// Returns `0` when the id is not a MicroProfile component.
pub fn mp_component_level(feature_id: &str) -> u8 {
    if !feature_id.starts_with(MP_PREFIX) {
        return 0;
    }
    match parse_feature_name(feature_id) {
        Some(f) => mp_level_for(&f.name, &f.version),
        None => 0,
    }
}

/// Same lookup as [`mp_component_level`] over an already decoded name.
pub fn mp_level_for(name: &str, version: &str) -> u8 {
    if !name.starts_with(MP_PREFIX) {
        return 0;
    }
    let Some(component) = mp_component(name) else {
        return 0;
    };

    // Highest level first.
    for idx in (0..MP_LEVELS).rev() {
        let level = (idx + 1) as u8;
        let recorded = component.levels[idx];
        if recorded < version {
            // Newer than this level's version but not newer than the next
            // level's, so the next level is the first to ship it.
            return if idx + 1 == MP_LEVELS { MP_LEVELS as u8 } else { level + 1 };
        }
        if recorded == version {
            return level;
        }
    }
    // Older than anything recorded for MicroProfile 1.
    1
}
