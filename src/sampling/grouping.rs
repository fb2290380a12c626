/// Groups consecutive items that share a key. The last open group is
/// flushed when the input ends. The first error ends the iteration.
pub struct ContiguousGroups<I, T, F> {
    inner: I,
    key: F,
    pending: Option<T>,
    done: bool,
}

pub fn group_contiguous<I, T, E, K, F>(inner: I, key: F) -> ContiguousGroups<I::IntoIter, T, F>
where
    I: IntoIterator<Item = Result<T, E>>,
    F: FnMut(&T) -> K,
    K: PartialEq,
{
    ContiguousGroups {
        inner: inner.into_iter(),
        key,
        pending: None,
        done: false,
    }
}

impl<I, T, E, K, F> Iterator for ContiguousGroups<I, T, F>
where
    I: Iterator<Item = Result<T, E>>,
    F: FnMut(&T) -> K,
    K: PartialEq,
{
    type Item = Result<Vec<T>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let first = match self.pending.take() {
            Some(item) => item,
            None => match self.inner.next() {
                Some(Ok(item)) => item,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return None;
                }
            },
        };

        let group_key = (self.key)(&first);
        let mut group = vec![first];
        loop {
            match self.inner.next() {
                Some(Ok(item)) => {
                    if (self.key)(&item) == group_key {
                        group.push(item);
                    } else {
                        self.pending = Some(item);
                        break;
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        Some(Ok(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(items: &[&'static str]) -> Vec<Result<&'static str, ()>> {
        items.iter().copied().map(Ok).collect()
    }

    #[test]
    fn final_group_is_flushed() {
        let groups: Vec<_> = group_contiguous(ok(&["a", "a", "b", "c", "c"]), |s| *s)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(groups, vec![vec!["a", "a"], vec!["b"], vec!["c", "c"]]);
    }

    #[test]
    fn non_adjacent_repeats_form_separate_groups() {
        let groups: Vec<_> = group_contiguous(ok(&["a", "b", "a"]), |s| *s)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn error_stops_iteration() {
        let input = vec![Ok("a"), Err(()), Ok("b")];
        let mut groups = group_contiguous(input, |s| *s);
        assert!(matches!(groups.next(), Some(Err(()))));
        assert!(groups.next().is_none());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut groups = group_contiguous(ok(&[]), |s| *s);
        assert!(groups.next().is_none());
    }
}
