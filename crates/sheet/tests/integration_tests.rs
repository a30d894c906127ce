//! Integration tests for u-cutstock-sheet.

use approx::assert_relative_eq;
use u_cutstock_sheet::{
    calculate_remnants, calculate_remnants_with, is_guillotine_cuttable, pack, pack_with_config,
    Config, Cut, CuttingMethod, Error, GuillotinePacker, GuillotineFitRule, GuillotineSplitRule,
    Optimizer, PackingMethod, PackingResult, PackingSummary, Packer, PlacedCut, RemnantScan, Sheet,
    SortStrategy,
};
use u_cutstock_core::{expand_cuts, sort_pieces, Rect};

fn machine(width: f64, height: f64) -> Sheet {
    Sheet::new(width, height).with_cutting_method(CuttingMethod::Machine)
}

fn manual(width: f64, height: f64) -> Sheet {
    Sheet::new(width, height).with_cutting_method(CuttingMethod::Manual)
}

fn mixed_cuts() -> Vec<Cut> {
    vec![
        Cut::new("A", 42.0, 27.0).with_quantity(6),
        Cut::new("B", 18.5, 33.0).with_quantity(5),
        Cut::new("C", 60.0, 12.0).with_quantity(3),
        Cut::new("D", 11.0, 11.0).with_quantity(8),
    ]
}

/// Checks the layout invariants every result must satisfy.
fn assert_valid_layout(result: &PackingResult, sheet: &Sheet) {
    for pc in &result.placed_cuts {
        assert!(
            pc.rect().within_bounds(sheet.width, sheet.height),
            "{} leaves the sheet: {:?}",
            pc.piece.id,
            pc.rect()
        );
    }
    for (i, a) in result.placed_cuts.iter().enumerate() {
        for b in &result.placed_cuts[i + 1..] {
            assert!(
                !a.kerf_rect(sheet.kerf).intersects(&b.kerf_rect(sheet.kerf)),
                "{} and {} overlap",
                a.piece.id,
                b.piece.id
            );
        }
    }
    let area: f64 = result.placed_cuts.iter().map(PlacedCut::area).sum();
    assert_relative_eq!(
        result.utilization,
        area / sheet.area() * 100.0,
        epsilon = 1e-9
    );
    assert!((0.0..=100.0).contains(&result.utilization));
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_machine_sheet_eight_doors() {
        let sheet = machine(200.0, 300.0).with_kerf(0.3);
        let cuts = vec![Cut::new("door", 50.0, 30.0).with_quantity(8)];

        let result = pack(&cuts, &sheet).unwrap();

        assert_eq!(result.placed_count(), 8);
        assert!(result.is_complete());
        assert_relative_eq!(result.utilization, 20.0, epsilon = 1e-9);
        assert_valid_layout(&result, &sheet);
    }

    #[test]
    fn test_manual_pattern_with_salvage() {
        let sheet = manual(100.0, 100.0);
        let cuts = vec![
            Cut::new("big", 60.0, 60.0),
            Cut::new("small", 30.0, 30.0).with_quantity(4),
        ];

        let result = pack(&cuts, &sheet).unwrap();

        assert_eq!(result.method, PackingMethod::HybridPattern);
        assert_eq!(result.placed_of("big"), 1);
        assert_eq!(result.placed_of("small"), 4);
        assert_relative_eq!(result.utilization, 72.0, epsilon = 1e-9);
        assert!(result.placed_cuts.iter().any(|pc| pc.is_pattern));
        assert_valid_layout(&result, &sheet);
    }

    #[test]
    fn test_two_large_pieces_partial() {
        let sheet = machine(100.0, 100.0);
        let cuts = vec![Cut::new("A", 80.0, 80.0).with_quantity(2)];

        let result = pack(&cuts, &sheet).unwrap();

        assert_eq!(result.placed_count(), 1);
        assert_eq!(result.unplaced_count(), 1);
        assert!(!result.is_complete());
        assert!(result.is_successful());
    }
}

mod invariant_tests {
    use super::*;

    #[test]
    fn test_machine_layouts_valid_with_kerf() {
        for kerf in [0.0, 0.3, 2.0] {
            let sheet = machine(180.0, 120.0).with_kerf(kerf);
            let result = pack(&mixed_cuts(), &sheet).unwrap();
            assert!(result.is_successful());
            assert_valid_layout(&result, &sheet);
        }
    }

    #[test]
    fn test_every_candidate_layout_valid() {
        let sheet = machine(150.0, 110.0).with_kerf(0.5);
        let catalogue = Optimizer::new(Config::new().with_parallel(false))
            .optimize(&mixed_cuts(), &sheet)
            .unwrap();
        assert!(!catalogue.is_empty());
        for outcome in catalogue {
            let method = outcome.method();
            let result = outcome.into_result(0);
            assert_valid_layout(&result, &sheet);
            if method == PackingMethod::Guillotine {
                let rects: Vec<Rect> = result.placed_cuts.iter().map(PlacedCut::rect).collect();
                assert!(is_guillotine_cuttable(&rects, sheet.width, sheet.height));
            }
        }
    }

    #[test]
    fn test_manual_layouts_valid() {
        let sheet = manual(160.0, 100.0).with_kerf(0.2);
        let result = pack(&mixed_cuts(), &sheet).unwrap();
        assert_valid_layout(&result, &sheet);

        let grid: Vec<Rect> = result
            .placed_cuts
            .iter()
            .filter(|pc| pc.is_pattern)
            .map(PlacedCut::rect)
            .collect();
        assert!(!grid.is_empty());
        assert!(is_guillotine_cuttable(&grid, sheet.width, sheet.height));
    }

    #[test]
    fn test_guillotine_packer_on_sorted_pieces() {
        let sheet = machine(130.0, 90.0).with_kerf(1.0);
        let pieces = expand_cuts(&mixed_cuts()).unwrap();
        for sort in SortStrategy::ALL {
            let sorted = sort_pieces(&pieces, sort);
            let placed = GuillotinePacker::new(
                GuillotineSplitRule::ShorterLeftoverAxis,
                GuillotineFitRule::BestShortSideFit,
            )
            .pack(&sorted, &sheet)
            .unwrap();
            let rects: Vec<Rect> = placed.iter().map(PlacedCut::rect).collect();
            assert!(is_guillotine_cuttable(&rects, sheet.width, sheet.height));
        }
    }

    #[test]
    fn test_deterministic() {
        let sheet = machine(170.0, 130.0).with_kerf(0.3);
        let first = pack(&mixed_cuts(), &sheet).unwrap();
        let second = pack(&mixed_cuts(), &sheet).unwrap();
        assert_eq!(first.placed_cuts, second.placed_cuts);
        assert_eq!(first.strategy, second.strategy);
        assert_eq!(first.remnants, second.remnants);

        let sequential =
            pack_with_config(&mixed_cuts(), &sheet, &Config::new().with_parallel(false)).unwrap();
        assert_eq!(first.placed_cuts, sequential.placed_cuts);
    }

    #[test]
    fn test_rotation_disabled_is_honoured() {
        let sheet = machine(100.0, 100.0);
        let cuts = vec![Cut::new("tall", 30.0, 90.0).with_rotation(false).with_quantity(3)];
        let result = pack(&cuts, &sheet).unwrap();
        assert_eq!(result.placed_count(), 3);
        assert!(result.placed_cuts.iter().all(|pc| !pc.rotated));
    }
}

mod remnant_tests {
    use super::*;

    #[test]
    fn test_empty_layout_gives_whole_sheet() {
        let sheet = machine(250.0, 120.0);
        let remnants = calculate_remnants(&[], &sheet).unwrap();
        assert_eq!(remnants.len(), 1);
        assert_relative_eq!(remnants[0].width, 250.0);
        assert_relative_eq!(remnants[0].height, 120.0);
        assert_relative_eq!(remnants[0].area, 30000.0);
    }

    #[test]
    fn test_remnants_attached_and_large_enough() {
        for scan in [RemnantScan::Greedy, RemnantScan::Histogram] {
            let sheet = machine(200.0, 150.0).with_kerf(0.3);
            let config = Config::new().with_remnant_scan(scan);
            let result = pack_with_config(&mixed_cuts(), &sheet, &config).unwrap();

            let expected =
                calculate_remnants_with(&result.placed_cuts, &sheet, scan, 10.0).unwrap();
            assert_eq!(result.remnants, expected);
            for r in &result.remnants {
                assert!(r.width >= 10.0 && r.height >= 10.0);
                let rect = Rect::new(r.x, r.y, r.width, r.height);
                assert!(rect.within_bounds(sheet.width, sheet.height));
                for pc in &result.placed_cuts {
                    assert!(!rect.intersects(&pc.kerf_rect(sheet.kerf)));
                }
            }
            for pair in result.remnants.windows(2) {
                assert!(pair[0].area >= pair[1].area);
            }
        }
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_invalid_cuts_rejected() {
        let sheet = machine(100.0, 100.0);
        assert!(matches!(
            pack(&[Cut::new("A", 0.0, 10.0)], &sheet),
            Err(Error::InvalidCut(_))
        ));
        assert!(matches!(
            pack(&[Cut::new("A", 10.0, 10.0).with_quantity(0)], &sheet),
            Err(Error::InvalidCut(_))
        ));
    }

    #[test]
    fn test_duplicate_cut_ids_rejected() {
        let cuts = vec![
            Cut::new("A", 30.0, 30.0).with_quantity(2),
            Cut::new("A", 50.0, 10.0),
        ];
        for sheet in [manual(100.0, 100.0), machine(100.0, 100.0)] {
            assert!(matches!(pack(&cuts, &sheet), Err(Error::InvalidCut(_))));
        }
    }

    #[test]
    fn test_invalid_sheet_rejected() {
        let cuts = vec![Cut::new("A", 10.0, 10.0)];
        assert!(matches!(
            pack(&cuts, &machine(-5.0, 100.0)),
            Err(Error::InvalidSheet(_))
        ));
        assert!(matches!(
            pack(&cuts, &machine(100.0, 100.0).with_kerf(-1.0)),
            Err(Error::InvalidSheet(_))
        ));
    }

    #[test]
    fn test_empty_cut_list() {
        let result = pack(&[], &machine(100.0, 100.0)).unwrap();
        assert_eq!(result.placed_count(), 0);
        assert!(result.is_complete());
        assert_eq!(result.remnants.len(), 1);
    }

    #[test]
    fn test_summary() {
        let sheet = machine(200.0, 300.0);
        let result = pack(&[Cut::new("door", 50.0, 30.0).with_quantity(8)], &sheet).unwrap();
        let summary = PackingSummary::from(&result);
        assert_eq!(summary.total_placed, 8);
        assert_eq!(summary.total_requested, 8);
        assert_relative_eq!(summary.utilization_percent, 20.0, epsilon = 1e-9);
    }
}
