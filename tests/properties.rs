use crossfill_core::arc_consistency::{ac3, enforce_node_consistency};
use crossfill_core::assignment::{is_complete, is_consistent};
use crossfill_core::domains::Domains;
use crossfill_core::{find_fill, Assignment, FillOptions, GridConfig, WordList};
use proptest::prelude::*;

const SMALL_TEMPLATE: &str = "
    ...
    #.#
    ...
";

const SQUARE_TEMPLATE: &str = "
    ...
    ...
    ...
";

fn inference_options() -> FillOptions {
    FillOptions {
        inference: true,
        ..FillOptions::default()
    }
}

/// Check every assignment of words to the three slots of `SMALL_TEMPLATE` directly.
fn brute_force_small_grid(config: &GridConfig, word_list: &WordList) -> bool {
    let word_count = word_list.len();
    (0..word_count).any(|a| {
        (0..word_count).any(|b| {
            (0..word_count).any(|c| {
                let mut assignment = Assignment::new();
                assignment.insert(0, a);
                assignment.insert(1, b);
                assignment.insert(2, c);
                is_consistent(config, word_list, &assignment)
            })
        })
    })
}

proptest! {
    #[test]
    fn search_agrees_with_brute_force(words in prop::collection::vec("[abct]{2,3}", 1..9)) {
        let config = GridConfig::from_template(SMALL_TEMPLATE).unwrap();
        let word_list = WordList::from_words(&words).unwrap();
        let expected = brute_force_small_grid(&config, &word_list);

        for options in [FillOptions::default(), inference_options()] {
            let result = find_fill(&config, &word_list, options);
            prop_assert_eq!(result.is_some(), expected);

            if let Some(result) = result {
                prop_assert!(is_complete(&config, &result.assignment));
                prop_assert!(is_consistent(&config, &word_list, &result.assignment));
            }
        }
    }

    #[test]
    fn arc_consistency_keeps_every_fill(words in prop::collection::vec("[abc]{3}", 1..12)) {
        let config = GridConfig::from_template(SQUARE_TEMPLATE).unwrap();
        let word_list = WordList::from_words(&words).unwrap();

        let mut domains = Domains::new(&config, &word_list);
        enforce_node_consistency(&config, &word_list, &mut domains, None);
        let ac3_result = ac3(&config, &word_list, &mut domains, None);
        let fill = find_fill(&config, &word_list, FillOptions::default());

        match (ac3_result, fill) {
            (Err(failure), fill) => {
                prop_assert!(domains.is_wiped_out(failure.wiped_out_slot_id));
                prop_assert!(fill.is_none());
            }
            (Ok(_), fill) => {
                prop_assert!((0..config.slot_count()).all(|slot_id| !domains.is_wiped_out(slot_id)));
                if let Some(fill) = fill {
                    for (slot_id, word_id) in fill.assignment.iter() {
                        prop_assert!(domains.contains(slot_id, word_id));
                    }
                }
            }
        }
    }

    #[test]
    fn arc_consistency_is_idempotent(words in prop::collection::vec("[abct]{3}", 1..12)) {
        let config = GridConfig::from_template(SQUARE_TEMPLATE).unwrap();
        let word_list = WordList::from_words(&words).unwrap();

        let mut domains = Domains::new(&config, &word_list);
        enforce_node_consistency(&config, &word_list, &mut domains, None);

        if ac3(&config, &word_list, &mut domains, None).is_ok() {
            let before = domains.snapshot();
            let second = ac3(&config, &word_list, &mut domains, None).unwrap();
            prop_assert_eq!(second.eliminations, 0);
            prop_assert_eq!(domains.snapshot(), before);
        }
    }

    #[test]
    fn node_consistency_leaves_only_matching_lengths(
        words in prop::collection::vec("[a-e]{1,5}", 1..16),
    ) {
        let config = GridConfig::from_template(
            "
            ....#
            .#...
            .....
            ",
        )
        .unwrap();
        let word_list = WordList::from_words(&words).unwrap();

        let mut domains = Domains::new(&config, &word_list);
        enforce_node_consistency(&config, &word_list, &mut domains, None);

        for slot_config in &config.slot_configs {
            let expected: Vec<usize> = (0..word_list.len())
                .filter(|&word_id| word_list.word(word_id).length() == slot_config.length)
                .collect();
            prop_assert_eq!(domains.words(slot_config.id), expected);
        }
    }

    #[test]
    fn overlaps_are_symmetric(rows in prop::collection::vec("[.#]{5}", 1..6)) {
        let Ok(config) = GridConfig::from_template(&rows.join("\n")) else {
            return Ok(());
        };

        for a in 0..config.slot_count() {
            for b in 0..config.slot_count() {
                prop_assert_eq!(
                    config.overlaps(a, b),
                    config.overlaps(b, a).map(|(i, j)| (j, i))
                );
                prop_assert_eq!(config.overlaps(a, b).is_some(), config.neighbors(a).contains(&b));
            }
        }
    }
}
