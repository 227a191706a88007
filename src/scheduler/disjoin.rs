//! Declustering of start sequences.

/// Rearranges `items` so that neighbours rarely share a key.
///
/// Two sweeps run from the back of the list, the second one on the reversed
/// list. Whenever two adjacent items share a key, the nearest earlier item
/// with a different key is moved in between them.
///
/// If no key occurs in more than `⌈n/2⌉` positions the result has no equal
/// neighbours. Otherwise the pass does what it can and never fails.
pub fn disjoin<T, K, F>(items: &mut Vec<T>, mut key: F)
where
    K: PartialEq,
    F: FnMut(&T) -> K,
{
    sweep(items, &mut key);
    items.reverse();
    sweep(items, &mut key);
    items.reverse();
}

fn sweep<T, K, F>(items: &mut Vec<T>, key: &mut F)
where
    K: PartialEq,
    F: FnMut(&T) -> K,
{
    let mut i = items.len();
    while i >= 2 {
        i -= 1;
        let current = key(&items[i]);
        if key(&items[i - 1]) != current {
            continue;
        }
        // items[j + 1..=i] all share `current`
        if let Some(j) = (0..i - 1).rev().find(|&j| key(&items[j]) != current) {
            let moved = items.remove(j);
            items.insert(i - 1, moved);
        }
    }
}
