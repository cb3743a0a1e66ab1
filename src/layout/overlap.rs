// Overlap resolution
// Packs a day's event rectangles into horizontal slots so overlapping
// events share the section width instead of covering each other.

use egui::{pos2, Rect};

use super::ItemFrame;

/// Strict AABB intersection: rectangles that only touch along an edge do
/// not overlap. Back-to-back events (one ending where the next starts)
/// must stay full width.
pub(crate) fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// Resolve overlaps among the raw (full-section-width) rectangles of one
/// section. Returns a final frame per input rectangle, in input order.
///
/// Clusters are single-hop: a seed rectangle is grouped with every not yet
/// processed rectangle that intersects the seed itself, not with rectangles
/// reachable only transitively. Within a cluster the slot count is the
/// maximum simultaneous overlap, sampled at one-pixel granularity over the
/// cluster's vertical extent, and slots are assigned greedily left to
/// right in a single pass over the already placed members. Z-order
/// increases strictly with placement order across the whole section.
pub(crate) fn resolve_overlaps(raw: &[Rect], section_min_x: f32, section_width: f32) -> Vec<ItemFrame> {
    let mut frames: Vec<Option<ItemFrame>> = vec![None; raw.len()];
    let mut processed = vec![false; raw.len()];
    let mut z_index = 0;

    for seed in 0..raw.len() {
        if processed[seed] {
            continue;
        }

        let mut cluster = vec![seed];
        for other in (seed + 1)..raw.len() {
            if !processed[other] && rects_overlap(raw[other], raw[seed]) {
                cluster.push(other);
            }
        }
        for &member in &cluster {
            processed[member] = true;
        }

        if cluster.len() == 1 {
            frames[seed] = Some(ItemFrame {
                rect: raw[seed],
                z_index,
            });
            z_index += 1;
            continue;
        }

        let divisions = max_simultaneous_overlap(raw, &cluster);
        let division_width = (section_width / divisions as f32).floor();

        let mut placed: Vec<Rect> = Vec::with_capacity(cluster.len());
        for &member in &cluster {
            let rect_at = |slot: usize| {
                let left = section_min_x + slot as f32 * division_width;
                Rect::from_min_max(
                    pos2(left, raw[member].min.y),
                    pos2(left + division_width, raw[member].max.y),
                )
            };

            let mut slot = 0;
            let mut candidate = rect_at(slot);
            for &prev in &placed {
                if rects_overlap(candidate, prev) {
                    slot += 1;
                    candidate = rect_at(slot);
                }
            }

            placed.push(candidate);
            frames[member] = Some(ItemFrame {
                rect: candidate,
                z_index,
            });
            z_index += 1;
        }
    }

    frames.into_iter().map(|f| f.unwrap()).collect()
}

/// Maximum number of cluster members covering any single Y coordinate,
/// sampled at unit-height granularity over the cluster's extent.
fn max_simultaneous_overlap(raw: &[Rect], cluster: &[usize]) -> usize {
    let min_y = cluster
        .iter()
        .map(|&i| raw[i].min.y)
        .fold(f32::INFINITY, f32::min);
    let max_y = cluster
        .iter()
        .map(|&i| raw[i].max.y)
        .fold(f32::NEG_INFINITY, f32::max);

    let mut divisions = 1;
    let mut y = min_y;
    while y < max_y {
        let covering = cluster
            .iter()
            .filter(|&&i| raw[i].min.y <= y && y < raw[i].max.y)
            .count();
        divisions = divisions.max(covering);
        y += 1.0;
    }
    divisions
}
