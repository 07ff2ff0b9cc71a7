// src/load_balancer/algorithm.rs
use crate::pool::Server;
use std::cmp::Ordering;

/// Ranks a pool and reports which servers share the best rank.
pub trait SelectionPolicy: Send + Sync {
    /// Indices into `servers` of every server tied at the minimum rank, in
    /// pool order. Empty only when `servers` is empty.
    fn tie_set(&self, servers: &[Server]) -> Vec<usize>;

    fn name(&self) -> &'static str;
}

/// One pass over `servers`, keeping every index whose key equals the running minimum.
pub(crate) fn min_key_indices<K, F>(servers: &[Server], key: F) -> Vec<usize>
where
    K: PartialOrd,
    F: Fn(&Server) -> K,
{
    let mut best: Option<K> = None;
    let mut tied = Vec::new();

    for (index, server) in servers.iter().enumerate() {
        let candidate = key(server);
        let ordering = match &best {
            None => Ordering::Less,
            Some(current) => candidate.partial_cmp(current).unwrap_or(Ordering::Greater),
        };

        match ordering {
            Ordering::Less => {
                best = Some(candidate);
                tied.clear();
                tied.push(index);
            }
            Ordering::Equal => tied.push(index),
            Ordering::Greater => {}
        }
    }

    tied
}
