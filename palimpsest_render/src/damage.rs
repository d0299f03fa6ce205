// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage regions and the rect merge used to bound them.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;
use palimpsest_core::geometry::{has_area, is_valid, merge_cost, overlaps, union_into};

/// What a layer repainted in one refresh.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire surface was redrawn.
    #[default]
    Full,
    /// Only these device-pixel rects were redrawn.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous frame's pixels were kept.
    None,
}

impl DamageRegion {
    /// Returns `true` if nothing was redrawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(a), Self::Rects(b)) => {
                let mut merged = a.clone();
                merged.extend_from_slice(b);
                *self = Self::Rects(merged);
            }
        }
    }
}

/// Clusters `candidates` into at most `max` rects covering all of them.
///
/// Invalid (non-finite) and zero-area rects are ignored. Each remaining rect
/// joins the first cluster it overlaps, touching edges included. While
/// there are too many clusters, the pair whose union wastes the least area
/// is merged; ties keep the first pair in row-major order. Finally any
/// clusters that came to overlap are merged until none do.
///
/// A `max` of zero is treated as one.
#[must_use]
pub fn merge_and_bound(candidates: &[Rect], max: usize) -> Vec<Rect> {
    let max = max.max(1);
    let mut clusters = cluster(candidates);
    if clusters.len() > max {
        bound(&mut clusters, max);
    }

    resolve_overlaps(&mut clusters);
    clusters
}

/// Joins each usable rect into the first cluster it overlaps.
fn cluster(candidates: &[Rect]) -> Vec<Rect> {
    let mut clusters: Vec<Rect> = Vec::new();
    for rect in candidates
        .iter()
        .filter(|r| is_valid(r) && has_area(r))
        .map(Rect::abs)
    {
        match clusters.iter_mut().find(|c| overlaps(c, &rect)) {
            Some(cluster) => union_into(cluster, &rect),
            None => clusters.push(rect),
        }
    }
    clusters
}

/// Merges the cheapest pair until at most `max` clusters remain.
///
/// Each row caches its cheapest partner to the right. After a merge only
/// the merged row and the rows that pointed at either merged cluster are
/// rescanned. Absorbed clusters are marked dead and dropped at the end, so
/// row-major order is stable throughout.
fn bound(clusters: &mut Vec<Rect>, max: usize) {
    let mut alive = vec![true; clusters.len()];
    let mut best: Vec<Option<(usize, f64)>> = (0..clusters.len())
        .map(|i| cheapest_partner(clusters, &alive, i))
        .collect();
    let mut remaining = clusters.len();

    while remaining > max {
        let Some((i, j)) = cheapest_pair(&best) else {
            break;
        };
        let absorbed = clusters[j];
        union_into(&mut clusters[i], &absorbed);
        alive[j] = false;
        best[j] = None;
        remaining -= 1;

        best[i] = cheapest_partner(clusters, &alive, i);
        for (r, slot) in best.iter_mut().enumerate().take(i) {
            if !alive[r] {
                continue;
            }
            match *slot {
                Some((col, cost)) if col != i && col != j => {
                    let joined = merge_cost(&clusters[r], &clusters[i]);
                    // Equal cost keeps the leftmost column.
                    if joined < cost || (i < col && joined <= cost) {
                        *slot = Some((i, joined));
                    }
                }
                _ => *slot = cheapest_partner(clusters, &alive, r),
            }
        }
        for (r, slot) in best.iter_mut().enumerate().take(j).skip(i + 1) {
            if alive[r] && slot.is_some_and(|(col, _)| col == j) {
                *slot = cheapest_partner(clusters, &alive, r);
            }
        }
    }

    *clusters = clusters
        .iter()
        .zip(&alive)
        .filter(|&(_, &keep)| keep)
        .map(|(c, _)| *c)
        .collect();
}

/// The first live `j > i` whose merge with `i` wastes the least area.
fn cheapest_partner(clusters: &[Rect], alive: &[bool], i: usize) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (j, b) in clusters.iter().enumerate().skip(i + 1) {
        if !alive[j] {
            continue;
        }
        let cost = merge_cost(&clusters[i], b);
        if best.is_none_or(|(_, c)| cost < c) {
            best = Some((j, cost));
        }
    }
    best
}

/// The first row-major `(i, j)` pair among the cached row minima.
fn cheapest_pair(best: &[Option<(usize, f64)>]) -> Option<(usize, usize)> {
    let mut pick: Option<(usize, usize, f64)> = None;
    for (i, row) in best.iter().enumerate() {
        if let Some((j, cost)) = *row
            && pick.is_none_or(|(_, _, c)| cost < c)
        {
            pick = Some((i, j, cost));
        }
    }
    pick.map(|(i, j, _)| (i, j))
}

fn resolve_overlaps(clusters: &mut Vec<Rect>) {
    'scan: loop {
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                if overlaps(&clusters[i], &clusters[j]) {
                    let absorbed = clusters.remove(j);
                    union_into(&mut clusters[i], &absorbed);
                    continue 'scan;
                }
            }
        }
        break;
    }
}
