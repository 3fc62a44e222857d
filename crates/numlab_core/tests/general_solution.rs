use numlab_core::ode::{group_roots, Oscillation};
use numlab_core::{general_solution, solve_ode_general, Polynomial, PolynomialError, RootSettings};

#[test]
fn fixed_examples_have_expected_term_counts() {
    let cases: [(&[f64], usize); 5] = [
        (&[1.0, -3.0, 2.0], 2),
        (&[1.0, -4.0, 4.0], 2),
        (&[1.0, 0.0, 4.0], 2),
        (&[1.0, 0.0, 2.0, 0.0, 1.0], 4),
        (&[1.0, -6.0, 12.0, -8.0], 3),
    ];
    for (coefficients, expected) in cases {
        let solution =
            general_solution(coefficients, &RootSettings::default()).expect("solution should build");
        assert_eq!(solution.terms.len(), expected, "{solution}");
        assert!(solution.to_string().starts_with("y(x) = C_1"));
    }
}

#[test]
fn term_count_matches_degree_for_mixed_spectrum() {
    // (r + 1)^2 (r^2 - 2r + 5) = r^4 + 0 r^3 + 2 r^2 + 8 r + 5
    let coefficients = [1.0, 0.0, 2.0, 8.0, 5.0];
    let solution =
        general_solution(&coefficients, &RootSettings::default()).expect("solution should build");
    assert_eq!(solution.terms.len(), 4);

    let real: Vec<_> = solution
        .terms
        .iter()
        .filter(|t| t.oscillation.is_none())
        .collect();
    assert_eq!(real.len(), 2);
    assert!(real.iter().all(|t| (t.rate + 1.0).abs() < 1e-9));

    let oscillating: Vec<_> = solution
        .terms
        .iter()
        .filter_map(|t| t.oscillation.map(|(kind, w)| (kind, w, t.rate)))
        .collect();
    assert_eq!(oscillating.len(), 2);
    assert_eq!(oscillating[0].0, Oscillation::Cos);
    assert_eq!(oscillating[1].0, Oscillation::Sin);
    for (_, w, rate) in oscillating {
        assert!((w - 2.0).abs() < 1e-9);
        assert!((rate - 1.0).abs() < 1e-9);
    }
}

#[test]
fn grouping_multiplicities_sum_to_degree() {
    let polynomial = Polynomial::from_descending(&[1.0, -6.0, 12.0, -8.0]).expect("valid");
    let settings = RootSettings::default();
    let roots = polynomial.roots(&settings).expect("roots");
    let groups = group_roots(&polynomial, &roots, &settings);
    let total: usize = groups.iter().map(|g| g.multiplicity).sum();
    assert_eq!(total, polynomial.degree());
    assert_eq!(groups.len(), 1);
}

#[test]
fn errors_convert_into_anyhow() {
    let result: anyhow::Result<String> = solve_ode_general(&[]).map_err(Into::into);
    let err = result.expect_err("empty input must fail");
    assert!(err.downcast_ref::<PolynomialError>().is_some());
}

#[test]
fn structured_polynomials_do_not_stall_root_finding() {
    // r^4 + 1 and (r^2 + 1)^3
    for (coefficients, degree) in [
        (vec![1.0, 0.0, 0.0, 0.0, 1.0], 4),
        (vec![1.0, 0.0, 3.0, 0.0, 3.0, 0.0, 1.0], 6),
    ] {
        let solution = general_solution(&coefficients, &RootSettings::default())
            .expect("solution should build");
        assert_eq!(solution.terms.len(), degree, "{solution}");
        assert!(solution.terms.iter().all(|t| t.oscillation.is_some()));
    }
}
