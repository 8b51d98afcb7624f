//! Statistics over hazard curves from several logic-tree realizations.

use std::collections::HashMap;

use crate::domain::{HazardCurve, Site};

use super::error::{HazardError, HazardResult};
use super::validator::validate_probabilities;

fn check_grid(curves: &[&HazardCurve]) -> HazardResult<()> {
    let Some(first) = curves.first() else {
        return Err(HazardError::invalid(
            "At least one hazard curve is required",
        ));
    };
    if curves.iter().any(|c| !c.same_levels(first)) {
        return Err(HazardError::invalid(
            "Hazard curves must share the same intensity levels",
        ));
    }
    Ok(())
}

fn pointwise(curves: &[&HazardCurve], reduce: impl Fn(&mut [f64]) -> f64) -> HazardCurve {
    let levels = curves[0].levels().to_vec();
    let mut column = Vec::with_capacity(curves.len());
    let poes = (0..levels.len())
        .map(|i| {
            column.clear();
            column.extend(curves.iter().map(|c| c.poes()[i]));
            reduce(&mut column)
        })
        .collect();

    HazardCurve::from_points(levels, poes).unwrap_or_else(|| HazardCurve::seed(&[]))
}

/// Point-wise arithmetic mean of the PoEs
pub fn mean_curve(curves: &[&HazardCurve]) -> HazardResult<HazardCurve> {
    check_grid(curves)?;
    Ok(pointwise(curves, |values| {
        values.iter().sum::<f64>() / values.len() as f64
    }))
}

/// Point-wise quantile of the PoEs, interpolating linearly between order
/// statistics
pub fn quantile_curve(curves: &[&HazardCurve], quantile: f64) -> HazardResult<HazardCurve> {
    validate_probabilities("Quantile levels", &[quantile])?;
    check_grid(curves)?;
    Ok(pointwise(curves, |values| quantile_of(values, quantile)))
}

fn quantile_of(values: &mut [f64], quantile: f64) -> f64 {
    values.sort_by(f64::total_cmp);
    let position = quantile * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    values[lower] + fraction * (values[upper] - values[lower])
}

/// Intensity level at which `curve` reaches `poe`.
///
/// Interpolates in log-log space. A `poe` outside the curve's range yields the
/// level at the nearest end. Points with zero probability are ignored.
pub fn hazard_map_level(curve: &HazardCurve, poe: f64) -> HazardResult<f64> {
    if !(poe > 0.0 && poe <= 1.0) {
        return Err(HazardError::invalid(format!(
            "Hazard map PoE must lie in (0, 1], got {}",
            poe
        )));
    }

    // (ln poe, ln level), ascending by poe
    let mut points: Vec<(f64, f64)> = curve
        .points()
        .filter(|(_, p)| *p > 0.0)
        .map(|(level, p)| (p.ln(), level.ln()))
        .collect();
    if points.is_empty() {
        return Err(HazardError::invalid(
            "Hazard curve has no positive probabilities",
        ));
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let x = poe.ln();
    let (first, last) = (points[0], points[points.len() - 1]);
    if x <= first.0 {
        return Ok(first.1.exp());
    }
    if x >= last.0 {
        return Ok(last.1.exp());
    }

    let level = points
        .windows(2)
        .find(|pair| x <= pair[1].0)
        .map(|pair| {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if x1 == x0 {
                y1
            } else {
                y0 + (x - x0) * (y1 - y0) / (x1 - x0)
            }
        })
        .unwrap_or(last.1);

    Ok(level.exp())
}

fn per_site(
    realizations: &[HashMap<Site, HazardCurve>],
    sites: &[Site],
    mut reduce: impl FnMut(&[&HazardCurve]) -> HazardResult<HazardCurve>,
) -> HazardResult<HashMap<Site, HazardCurve>> {
    if realizations.is_empty() {
        return Err(HazardError::invalid(
            "At least one realization is required",
        ));
    }

    let mut out = HashMap::with_capacity(sites.len());
    for site in sites {
        let curves = realizations
            .iter()
            .enumerate()
            .map(|(i, curves)| {
                curves.get(site).ok_or_else(|| {
                    HazardError::invalid(format!("Realization {} has no curve for site {}", i, site))
                })
            })
            .collect::<HazardResult<Vec<_>>>()?;
        out.insert(*site, reduce(&curves)?);
    }
    Ok(out)
}

/// Mean curve of every site across realizations
pub fn mean_curves(
    realizations: &[HashMap<Site, HazardCurve>],
    sites: &[Site],
) -> HazardResult<HashMap<Site, HazardCurve>> {
    per_site(realizations, sites, mean_curve)
}

/// Quantile curve of every site across realizations
pub fn quantile_curves(
    realizations: &[HashMap<Site, HazardCurve>],
    sites: &[Site],
    quantile: f64,
) -> HazardResult<HashMap<Site, HazardCurve>> {
    per_site(realizations, sites, |curves| quantile_curve(curves, quantile))
}
