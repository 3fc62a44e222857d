//! Demonstration commands. Each one renders its report into a `String`.

use crate::config::LabConfig;
use anyhow::{Context, Result};
use nalgebra::DMatrix;
use num_complex::Complex;
use numlab_core::fourier::{dft_real, idft};
use numlab_core::geometry::{
    circle_intersections, foot_of_perpendicular, line_circle_intersections, line_intersection,
    Circle, Line, Point, Triangle,
};
use numlab_core::information::{
    cross_entropy, entropy, kl_divergence, mutual_information, random_distribution,
};
use numlab_core::linalg::{lu_determinant, pca, recursive_determinant, svd_from_eigen};
use numlab_core::ode::{general_solution, verify_solution};
use numlab_core::polynomial::{solve_cubic, solve_quadratic, Polynomial};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write;

/// Characteristic polynomials shown when `ode` is run without arguments.
pub const ODE_EXAMPLES: [(&str, &[f64]); 5] = [
    ("distinct real roots", &[1.0, -3.0, 2.0]),
    ("repeated real root", &[1.0, -4.0, 4.0]),
    ("complex conjugate roots", &[1.0, 0.0, 4.0]),
    ("repeated complex roots", &[1.0, 0.0, 2.0, 0.0, 1.0]),
    ("higher-order repeated root", &[1.0, -6.0, 12.0, -8.0]),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ode(Vec<f64>),
    Roots,
    Dft,
    Geometry,
    Info,
    Linalg,
    All,
}

impl Command {
    pub fn run(&self, config: &LabConfig) -> Result<String> {
        match self {
            Command::Ode(coefficients) => ode_report(coefficients, config),
            Command::Roots => roots_report(),
            Command::Dft => dft_report(),
            Command::Geometry => geometry_report(),
            Command::Info => info_report(config),
            Command::Linalg => linalg_report(),
            Command::All => {
                let mut out = String::new();
                for command in [
                    Command::Ode(Vec::new()),
                    Command::Roots,
                    Command::Dft,
                    Command::Geometry,
                    Command::Info,
                    Command::Linalg,
                ] {
                    out.push_str(&command.run(config)?);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }
}

fn ode_entry(out: &mut String, title: &str, coefficients: &[f64], config: &LabConfig) -> Result<()> {
    let solution = general_solution(coefficients, &config.roots)
        .with_context(|| format!("Failed to solve characteristic polynomial {coefficients:?}"))?;
    let polynomial = Polynomial::from_descending(coefficients)?;
    let deviation = verify_solution(
        &polynomial,
        &solution,
        config.verify_x_end,
        config.verify_steps,
    )?;

    writeln!(out, "--- {title} ---")?;
    writeln!(out, "coefficients: {coefficients:?}")?;
    writeln!(out, "{solution}")?;
    writeln!(
        out,
        "RK4 check on [0, {}]: max deviation {:.3e}",
        config.verify_x_end, deviation
    )?;
    Ok(())
}

pub fn ode_report(coefficients: &[f64], config: &LabConfig) -> Result<String> {
    let mut out = String::new();
    if coefficients.is_empty() {
        for (title, example) in ODE_EXAMPLES {
            ode_entry(&mut out, title, example, config)?;
        }
    } else {
        ode_entry(&mut out, "custom polynomial", coefficients, config)?;
    }
    Ok(out)
}

fn roots_report() -> Result<String> {
    let mut out = String::new();

    writeln!(out, "--- quadratic formula ---")?;
    for (a, b, c) in [(1.0, -3.0, 2.0), (1.0, 2.0, 5.0)] {
        let (r1, r2) = solve_quadratic(a, b, c, 1e-10)?;
        let f = |z: Complex<f64>| a * z * z + b * z + c;
        writeln!(out, "{a}x^2 + {b}x + {c}: roots {r1}, {r2}")?;
        writeln!(out, "  back substitution: {}, {}", f(r1), f(r2))?;
    }

    writeln!(out, "--- Cardano ---")?;
    let roots = solve_cubic(1.0, 0.0, 0.0, -1.0)?;
    for (idx, root) in roots.iter().enumerate() {
        writeln!(out, "x{} = {root}", idx + 1)?;
    }

    writeln!(out, "--- companion matrix ---")?;
    let ascending = [1.0, -3.0, 0.0, 2.0, -5.0];
    let polynomial = Polynomial::from_ascending(&ascending)?;
    let roots = polynomial.roots(&Default::default())?;
    writeln!(out, "c (x^i coefficients): {ascending:?}")?;
    for root in roots {
        writeln!(out, "  root {root}, |p(root)| = {:.2e}", polynomial.eval(root).norm())?;
    }
    Ok(out)
}

fn dft_report() -> Result<String> {
    let mut out = String::new();
    let signal = [1.0, 2.0, 3.0, 4.0];
    let spectrum = dft_real(&signal);
    let recovered = idft(&spectrum);
    writeln!(out, "--- discrete Fourier transform ---")?;
    writeln!(out, "f = {signal:?}")?;
    writeln!(out, "DFT(f) = {}", join_complex(&spectrum))?;
    writeln!(out, "IDFT(F) = {}", join_complex(&recovered))?;
    Ok(out)
}

fn join_complex(values: &[Complex<f64>]) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|z| format!("{:.4}{:+.4}i", z.re, z.im))
        .collect();
    format!("[{}]", parts.join(", "))
}

fn geometry_report() -> Result<String> {
    let mut out = String::new();
    writeln!(out, "--- perpendicular foot ---")?;
    let outside = Point::new(0.0, 5.0);
    let line = Line::new(1.0, -1.0, 0.0)?;
    let foot = foot_of_perpendicular(&outside, &line);
    let on_line = Point::new(0.0, 0.0);
    let a2 = outside.distance_squared(&foot);
    let b2 = on_line.distance_squared(&foot);
    let c2 = outside.distance_squared(&on_line);
    writeln!(out, "foot: {foot}")?;
    writeln!(out, "Pythagoras: a^2 + b^2 = {:.2}, c^2 = {:.2}", a2 + b2, c2)?;

    writeln!(out, "--- intersections ---")?;
    let other = Line::new(1.0, 1.0, -2.0)?;
    match line_intersection(&line, &other) {
        Some(p) => writeln!(out, "x - y = 0 and x + y - 2 = 0 meet at {p}")?,
        None => writeln!(out, "x - y = 0 and x + y - 2 = 0 are parallel")?,
    }
    let circle = Circle::new(Point::new(0.0, 0.0), 5.0)?;
    let points = line_circle_intersections(&Line::new(0.0, 1.0, -3.0)?, &circle);
    writeln!(out, "y = 3 meets x^2 + y^2 = 25 at {}", join_points(&points))?;
    let shifted = Circle::new(Point::new(6.0, 0.0), 5.0)?;
    let points = circle_intersections(&circle, &shifted)?;
    writeln!(out, "the circles around (0, 0) and (6, 0) meet at {}", join_points(&points))?;

    writeln!(out, "--- triangle transforms ---")?;
    let mut triangle = Triangle::new(
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
    );
    writeln!(out, "original: {triangle}")?;
    triangle.translate(2.0, 3.0);
    triangle.rotate(90.0);
    writeln!(out, "translated by (2, 3), rotated 90 degrees: {triangle}")?;
    Ok(out)
}

fn join_points(points: &[Point]) -> String {
    let parts: Vec<String> = points.iter().map(|p| p.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

fn info_report(config: &LabConfig) -> Result<String> {
    let mut out = String::new();
    let p = [0.2, 0.5, 0.3];
    let q = [0.3, 0.4, 0.3];
    let joint = DMatrix::from_row_slice(2, 2, &[0.1, 0.2, 0.3, 0.4]);

    writeln!(out, "--- information theory ---")?;
    writeln!(out, "Entropy H(P) = {:.6}", entropy(&p)?)?;
    writeln!(out, "Cross entropy H(P, Q) = {:.6}", cross_entropy(&p, &q)?)?;
    writeln!(out, "KL divergence D(P||Q) = {:.6}", kl_divergence(&p, &q)?)?;
    writeln!(out, "Mutual information I(X;Y) = {:.6}", mutual_information(&joint)?)?;

    writeln!(out, "--- H(p, p) < H(p, q) on random distributions ---")?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    for _ in 0..10 {
        let p = random_distribution(5, &mut rng)?;
        let q = random_distribution(5, &mut rng)?;
        let self_ce = cross_entropy(&p, &p)?;
        let ce = cross_entropy(&p, &q)?;
        writeln!(
            out,
            "H(p,p) = {self_ce:.6}, H(p,q) = {ce:.6}, holds: {}",
            self_ce < ce
        )?;
    }
    Ok(out)
}

fn linalg_report() -> Result<String> {
    let mut out = String::new();
    let a = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 2.0, 1.0, 3.0, 0.0, 2.0, 0.0, 5.0]);
    let x = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    writeln!(out, "--- matrix lab ---")?;
    writeln!(out, "recursive determinant: {:.2}", recursive_determinant(&a)?)?;
    writeln!(out, "LU determinant: {:.2}", lu_determinant(&a)?)?;

    let factors = svd_from_eigen(&x)?;
    let error = (factors.reconstruct() - &x).norm();
    writeln!(
        out,
        "SVD from eigendecomposition: singular values {:?}, reconstruction error {error:.2e}",
        factors.singular_values.as_slice()
    )?;

    let projected = pca(&x, 1)?;
    writeln!(out, "PCA (2D -> 1D): {:?}", projected.as_slice())?;
    Ok(out)
}
