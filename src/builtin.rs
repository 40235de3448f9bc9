//! Built-in text-art pack. A sprites directory given on the command line is
//! laid over it, so every name the behaviours ask for always resolves.

use crate::catalog::{frame_rate_for, Catalog, Frame};
use crate::config::AnimationSettings;

struct Sprite {
    category: &'static str,
    name: &'static str,
    frames: &'static [&'static [&'static str]],
}

const PACK: &[Sprite] = &[
    // sitting
    Sprite {
        category: "sitting",
        name: "sitting_spr_clover_sitting",
        frames: &[
            &["  _n_", " (o.o)", " _[#]_"],
            &["  _n_", " (-.-)", " _[#]_"],
        ],
    },
    Sprite {
        category: "sitting",
        name: "sitting_spr_clover_sit_dark",
        frames: &[
            &["  _n_", " (._.)", " _[#]_"],
            &["  _n_", " (. .)", " _[#]_"],
        ],
    },
    Sprite {
        category: "sitting",
        name: "sitting_spr_colver_wind",
        frames: &[
            &["  _n_  ~", " (o.o) ~", " _[#]_"],
            &["  _n_ ~", " (o.o)  ~", " _[#]_"],
            &["  _n_~", " (o.o)~", " _[#]_"],
        ],
    },
    Sprite {
        category: "sitting",
        name: "spr_clover_casual",
        frames: &[&["  _n_", " (^.^)", " /[#]\\_", "   \\_"]],
    },
    // walking
    Sprite {
        category: "walking",
        name: "walking_spr_pl_right",
        frames: &[
            &["  _n_", " ( o.o)", "  [#]>", "  / |"],
            &["  _n_", " ( o.o)", "  [#]>", "  | \\"],
        ],
    },
    Sprite {
        category: "walking",
        name: "walking_spr_pl_left",
        frames: &[
            &["  _n_", " (o.o )", " <[#]", "  | \\"],
            &["  _n_", " (o.o )", " <[#]", "  / |"],
        ],
    },
    Sprite {
        category: "walking",
        name: "walking_spr_pl_up",
        frames: &[
            &["  _n_", " (   )", " /[#]\\", "  / |"],
            &["  _n_", " (   )", " /[#]\\", "  | \\"],
        ],
    },
    Sprite {
        category: "walking",
        name: "walking_spr_pl_down",
        frames: &[
            &["  _n_", " (o.o)", " /[#]\\", "  / |"],
            &["  _n_", " (o.o)", " /[#]\\", "  | \\"],
        ],
    },
    Sprite {
        category: "walking",
        name: "walking_spr_pl_run_right",
        frames: &[
            &["  _n_", " ( O.O)", " -[#]=", "  /  >"],
            &["  _n_", " ( O.O)", " =[#]-", "  >  \\"],
        ],
    },
    Sprite {
        category: "walking",
        name: "walking_spr_pl_run_left",
        frames: &[
            &["  _n_", " (O.O )", " =[#]-", " <  \\"],
            &["  _n_", " (O.O )", " -[#]=", " /  <"],
        ],
    },
    Sprite {
        category: "walking",
        name: "walking_spr_pl_run_up",
        frames: &[
            &["  _n_", " (   )", " \\[#]/", "  /  \\"],
            &["  _n_", " (   )", " /[#]\\", "  \\  /"],
        ],
    },
    Sprite {
        category: "walking",
        name: "walking_spr_pl_run_down",
        frames: &[
            &["  _n_", " (O.O)", " \\[#]/", "  /  \\"],
            &["  _n_", " (O.O)", " /[#]\\", "  \\  /"],
        ],
    },
    // dancing
    Sprite {
        category: "dancing",
        name: "dancing_spr_clover_dance",
        frames: &[
            &["  _n_", " (^o^)", " \\[#]/", "  / \\"],
            &["  _n_", " (^o^)", " /[#]\\", "  \\ /"],
            &["  _n_", " (^-^)", " \\[#]", "  / |"],
            &["  _n_", " (^-^)", "  [#]/", "  | \\"],
        ],
    },
    Sprite {
        category: "dancing",
        name: "dancing_spr_clover_twirl",
        frames: &[
            &["  _n_", " (o.o)", " -[#]-", "  / \\"],
            &["  _n_", " ( o.)", "  [#]", "  /|"],
            &["  _n_", " (   )", " -[#]-", "  / \\"],
            &["  _n_", " (.o )", "  [#]", "  |\\"],
        ],
    },
    // characters
    Sprite {
        category: "characters_interactions",
        name: "characters_interactions_spr_clover_wave",
        frames: &[
            &["  _n_", " (o.o)/", " /[#]", "  / \\"],
            &["  _n_", " (o.o)_", " /[#]", "  / \\"],
            &["  _n_", " (o.o)/", " /[#]", "  / \\"],
            &["  _n_", " (^.^)_", " /[#]", "  / \\"],
        ],
    },
    Sprite {
        category: "characters_interactions",
        name: "characters_interactions_spr_clover_hat_tip",
        frames: &[
            &["  _n_", " (o.o)", " /[#]\\", "  / \\"],
            &["   _n_", " (o.o)/", " /[#]", "  / \\"],
            &["    _n_", " (^.^)/", " /[#]", "  / \\"],
            &["  _n_", " (^.^)", " /[#]\\", "  / \\"],
        ],
    },
    Sprite {
        category: "characters_interactions",
        name: "characters_interactions_spr_clover_lasso",
        frames: &[
            &["      O", "  _n_/", " (o.o)", " /[#]", "  / \\"],
            &["   O", "  _n_\\", " (o.o)", " /[#]", "  / \\"],
            &["        O", "  _n_ /", " (o.o)", " /[#]", "  / \\"],
            &["", "  _n_", " (o.o)--O", " /[#]", "  / \\"],
        ],
    },
    // reactions
    Sprite {
        category: "nod",
        name: "nod",
        frames: &[
            &["  _n_", " (o.o)", " /[#]\\", "  / \\"],
            &["", "  _n_", " (-.-)", " /[#]\\", "  / \\"],
            &["  _n_", " (o.o)", " /[#]\\", "  / \\"],
        ],
    },
    Sprite {
        category: "poses",
        name: "poses_spr_clover_point",
        frames: &[
            &["  _n_", " (o.o)", " /[#]--", "  / \\"],
            &["  _n_", " (>.o)", " /[#]--*", "  / \\"],
        ],
    },
    Sprite {
        category: "poses",
        name: "poses_spr_clover_proud",
        frames: &[
            &["  _n_", " (-.-)", " >[#]<", "  / \\"],
            &["  _n_", " (^.^)", " >[#]<", "  / \\"],
        ],
    },
    // falling
    Sprite {
        category: "falls",
        name: "falls",
        frames: &[
            &["  _n_", " (O.O)", " \\[#]/", "  / \\"],
            &[" \\(O.O)/", "   [#]", "  /  \\", "  _n_"],
            &["", "", "   _n_", " _(x.x)[#]__"],
        ],
    },
    // sleeping
    Sprite {
        category: "lying",
        name: "lying_bed",
        frames: &[&[
            "  _n_",
            " (-.-)______",
            " |#########|",
            " |_________|",
        ]],
    },
    Sprite {
        category: "lying",
        name: "lying_zzz",
        frames: &[&["z"], &["  Z", "z"], &["    Z", "  Z", "z"]],
    },
    // rides
    Sprite {
        category: "cart",
        name: "cart",
        frames: &[
            &["     _n_", "    (o.o)", " ___|[#]|___", " \\_________/", "   O     O"],
            &["     _n_", "    (^.^)", " ___|[#]|___", " \\_________/", "   o     o"],
        ],
    },
    Sprite {
        category: "meme",
        name: "meme",
        frames: &[
            &["     _n_  [?]", "    (o.o)/", " ___|[#]|___", " \\_________/", "   O     O"],
            &["     _n_ [!]", "    (^.^)/", " ___|[#]|___", " \\_________/", "   o     o"],
        ],
    },
    Sprite {
        category: "basket",
        name: "basket",
        frames: &[
            &[
                "    .-~~~~-.   ",
                "  <(  o     )==",
                "    `-.__.-'   ",
                "      |  |",
                "     _n_ |",
                "    (o.o)/",
                "    [___]",
            ],
            &[
                "    .-~~~~-.   ",
                "  <(  o     )=~",
                "    `-.__.-'   ",
                "      |  |",
                "     _n_|",
                "    (^.^)",
                "    [___]",
            ],
        ],
    },
    // the Edward sequence
    Sprite {
        category: "edward_walking",
        name: "edward_walking_spr_ed_grab_clover",
        frames: &[
            &[" [o o]   _n_", " |-=-|  (o.o)", " | | |  /[#]\\", " /   \\  / \\"],
            &[" [o o] _n_", " |-=-|-(O.O)", " | | |  [#]", " /   \\  / \\"],
            &[" [o o]_n_", " |-=-|(O.O)", " | | | [#]", " /   \\"],
        ],
    },
    Sprite {
        category: "edward_walking",
        name: "edward_walking_spr_ed_up_walk_clover",
        frames: &[
            &[" [   ]_n_", " |---|(o.o)", " | | | [#]", "  / |"],
            &[" [   ]_n_", " |---|(o.o)", " | | | [#]", "  | \\"],
        ],
    },
    Sprite {
        category: "edward_walking",
        name: "edward_walking_spr_ed_right_walk_clover",
        frames: &[
            &[" [ o o]_n_", " |--=-|(o.o)", " | | | [#]", "  / |"],
            &[" [ o o]_n_", " |--=-|(o.o)", " | | | [#]", "  | \\"],
        ],
    },
    Sprite {
        category: "edward_walking",
        name: "edward_walking_spr_ed_down_walk_clover",
        frames: &[
            &[" [o o]_n_", " |-=-|(o.o)", " | | | [#]", "  / |"],
            &[" [o o]_n_", " |-=-|(o.o)", " | | | [#]", "  | \\"],
        ],
    },
    Sprite {
        category: "edward_walking",
        name: "edward_walking_spr_ed_left_walk_clover",
        frames: &[
            &["_n_[o o ]", "(o.o)|-=--|", " [#] | | |", "  / |"],
            &["_n_[o o ]", "(o.o)|-=--|", " [#] | | |", "  | \\"],
        ],
    },
    Sprite {
        category: "edward_walking",
        name: "edward_walking_spr_ed_place_clover",
        frames: &[
            &[" [o o]_n_", " |-=-|(o.o)", " | | | [#]", " /   \\"],
            &[" [o o]   _n_", " |-=-|  (o.o)", " | | |  /[#]\\", " /   \\  / \\"],
            &[" [^ ^]   _n_", " |-=-|  (o.o)", " | | |  /[#]\\", " /   \\  / \\"],
        ],
    },
    // showdown
    Sprite {
        category: "gun",
        name: "gun_spr_clover_geno_summon",
        frames: &[
            &["  _n_", " (o.o)", " /[#]\\", "  / \\"],
            &["  _n_", " (>.<)", " /[#]\\-", "  / \\"],
            &["  _n_", " (>.>)", " /[#]==", "  / \\"],
            &["  _n_", " (>.>)", " /[#]==-", "  / \\"],
        ],
    },
    Sprite {
        category: "gun",
        name: "gun_spr_clover_geno_unsummon",
        frames: &[
            &["  _n_", " (-.-)", " /[#]==", "  / \\"],
            &["  _n_", " (-.-)", " /[#]-", "  / \\"],
            &["  _n_", " (o.o)", " /[#]\\", "  / \\"],
        ],
    },
    Sprite {
        category: "gun",
        name: "gun_spr_heart_yellow_shot",
        frames: &[&["<3"], &["<3"]],
    },
    Sprite {
        category: "gun",
        name: "gun_spr_shot_strong",
        frames: &[
            &["", " . ", ""],
            &["", " o ", ""],
            &[" . ", ".O.", " . "],
            &["\\|/", "-@-", "/|\\"],
            &["*|*", "-@-", "*|*"],
        ],
    },
    Sprite {
        category: "dying",
        name: "dying",
        frames: &[
            &["  _n_", " (o.o)", " /[#]\\", "  / \\"],
            &["  _n_", " (;.;)", " /[#]\\", "  / \\"],
            &["  _n_", " (x.x)", "  [#]", "  / \\"],
            &["", "  _n_", " (x.x)", " _[#]_"],
            &["", "", "  _n_", " .(x.x)."],
            &["", "", "", "  . . ."],
        ],
    },
];

/// Builds the catalog for the built-in pack.
pub(crate) fn catalog(rates: &AnimationSettings) -> Catalog {
    let mut cat = Catalog::default();
    for s in PACK {
        let frames: Vec<Frame> = s
            .frames
            .iter()
            .filter_map(|lines| Frame::parse(&lines.join("\n")))
            .collect();
        cat.add(s.category, s.name.to_string(), frames, frame_rate_for(s.name, rates));
    }
    cat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_covers_behaviour_names() {
        let cat = catalog(&AnimationSettings::default());
        for name in [
            "sitting_spr_clover_sit_dark",
            "sitting_spr_clover_sitting",
            "sitting_spr_colver_wind",
            "spr_clover_casual",
            "walking_spr_pl_up",
            "walking_spr_pl_run_left",
            "falls",
            "lying_bed",
            "lying_zzz",
            "cart",
            "meme",
            "basket",
            "edward_walking_spr_ed_grab_clover",
            "edward_walking_spr_ed_place_clover",
            "gun_spr_clover_geno_summon",
            "gun_spr_clover_geno_unsummon",
            "gun_spr_shot_strong",
            "dying",
            "nod",
        ] {
            assert!(cat.exists(name), "missing {name}");
        }
        assert_eq!(cat.by_category("sitting").len(), 4);
        assert_eq!(cat.first_in("dancing"), Some("dancing_spr_clover_dance"));
        assert_eq!(cat.by_category("characters_interactions").len(), 3);
    }

    #[test]
    fn every_frame_is_non_empty() {
        let cat = catalog(&AnimationSettings::default());
        for name in cat.all_names() {
            let anim = cat.get(name).unwrap();
            assert!(!anim.frames.is_empty(), "{name} has no frames");
        }
        assert_eq!(cat.get("lying_zzz").unwrap().frames.len(), 3);
    }
}
