use std::collections::BTreeSet;
use log::*;

/// A dependency graph with a deterministic topological sort.
///
/// [`Depends::sort`] repeatedly takes the smallest node with no outstanding
/// dependencies, so ties between independently orderable nodes always break
/// the same way (by `Ord`, which for gate ids is declaration order).
#[derive(Debug, Clone)]
pub struct Depends<T> {
    nodes: Vec<T>,
    edges: Vec<(T, T)>,
}

/// Returned when no topological order exists. Carries the nodes involved in
/// the cycles, with nodes merely downstream of a cycle stripped away.
#[derive(Debug, PartialEq, Eq)]
pub struct CycleDetected<T>(pub Vec<T>);

impl<T: Eq + Clone + Ord + std::fmt::Debug> Depends<T> {
    pub fn new() -> Depends<T> {
        Depends {
            nodes: vec![],
            edges: vec![],
        }
    }

    pub fn add(&mut self, t: T) {
        if !self.nodes.contains(&t) {
            self.nodes.push(t);
        }
    }

    /// Records that `s` depends on `t`: `t` will come before `s` in the
    /// sorted order.
    pub fn add_dependency(&mut self, s: T, t: T) {
        self.add(s.clone());
        self.add(t.clone());

        let edge = (s, t);
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    fn index_of(&self, t: &T) -> usize {
        for (i, node) in self.nodes.iter().enumerate() {
            if node == t {
                return i;
            }
        }
        error!("Panic");
        panic!("Not found: {t:?}")
    }

    fn edge_indexes_of(&self, t: &T) -> Vec<usize> {
        let mut results = vec![];
        for (i, (sink, source)) in self.edges.iter().enumerate() {
            if sink == t {
                results.push(i);
            } else if source == t {
                results.push(i);
            }
        }
        results.sort();
        results.dedup();
        results
    }

    fn remove(&mut self, t: &T) {
        self.nodes.swap_remove(self.index_of(t));
        for i in self.edge_indexes_of(t).iter().rev() {
            self.edges.swap_remove(*i);
        }
    }

    /// Nodes with no outstanding dependencies, in ascending order.
    fn roots(&self) -> Vec<T> {
        let mut roots: BTreeSet<T> = self.nodes.iter().map(|n| n.to_owned()).collect();
        for (sink, _source) in &self.edges {
            roots.remove(sink);
        }
        roots.into_iter().collect()
    }

    /// Nodes that nothing depends on.
    fn leaves(&self) -> Vec<T> {
        let mut leaves: BTreeSet<T> = self.nodes.iter().map(|n| n.to_owned()).collect();
        for (_sink, source) in &self.edges {
            leaves.remove(source);
        }
        leaves.into_iter().collect()
    }

    pub fn sort(&self) -> Result<Vec<T>, CycleDetected<T>> {
        let mut copy = self.clone();
        let mut results = vec![];

        while !copy.nodes.is_empty() {
            let roots = copy.roots();

            // cycle detected
            if roots.is_empty() {
                return Err(CycleDetected(copy.cycle_nodes()));
            }

            // Take only the smallest ready node each round so the order is
            // independent of internal bookkeeping.
            let root = roots[0].clone();
            copy.remove(&root);
            results.push(root);
        }
        Ok(results)
    }

    /// Strips nodes that cannot lie on a cycle: anything nothing depends on.
    /// Called when sort() stalls, so every remaining node has a dependency.
    fn cycle_nodes(mut self) -> Vec<T> {
        loop {
            let leaves = self.leaves();
            if leaves.is_empty() {
                break;
            }
            for leaf in leaves {
                self.remove(&leaf);
            }
        }
        self.nodes.sort();
        self.nodes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sort_order() {
        let mut depends = Depends::new();
        depends.add_dependency("A", "B");
        depends.add_dependency("A", "C");

        depends.add_dependency("B", "D");
        depends.add_dependency("B", "E");

        depends.add_dependency("C", "E");

        depends.add("F");

        let mut roots = depends.roots();
        roots.sort();
        assert_eq!(roots, vec!["D", "E", "F"]);

        let sorted = depends.sort().unwrap();
        let a_idx = sorted.iter().position(|x| x == &"A").unwrap();
        let b_idx = sorted.iter().position(|x| x == &"B").unwrap();
        let c_idx = sorted.iter().position(|x| x == &"C").unwrap();
        let d_idx = sorted.iter().position(|x| x == &"D").unwrap();
        let e_idx = sorted.iter().position(|x| x == &"E").unwrap();
        let f_idx = sorted.iter().position(|x| x == &"F").unwrap();

        assert!(d_idx < a_idx);
        assert!(d_idx < b_idx);
        assert!(e_idx < b_idx);
        assert!(e_idx < c_idx);
        assert!(b_idx < a_idx);
        assert!(c_idx < a_idx);
        assert!(f_idx < sorted.len());
    }

    #[test]
    fn sort_is_deterministic() {
        let mut depends = Depends::new();
        depends.add(3usize);
        depends.add(1usize);
        depends.add(2usize);
        depends.add_dependency(1, 3);

        assert_eq!(depends.sort().unwrap(), vec![2, 3, 1]);
        assert_eq!(depends.sort().unwrap(), vec![2, 3, 1]);
    }

    #[test]
    fn cycle() {
        let mut depends = Depends::new();
        depends.add_dependency("A", "B");
        depends.add_dependency("B", "C");
        depends.add_dependency("C", "A");

        assert_eq!(depends.sort(), Err(CycleDetected(vec!["A", "B", "C"])));
    }

    #[test]
    fn cycle_strips_downstream_nodes() {
        let mut depends = Depends::new();
        depends.add_dependency("A", "B");
        depends.add_dependency("B", "A");
        // D depends on the cycle but is not part of it.
        depends.add_dependency("D", "A");

        assert_eq!(depends.sort(), Err(CycleDetected(vec!["A", "B"])));
    }
}
