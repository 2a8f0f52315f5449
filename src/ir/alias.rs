use std::collections::{BTreeMap, HashMap};

/// Union-find over variable names.
///
/// An equivalence edge is introduced by every move instruction and by the
/// bit-blaster when the solver renames a bit. A name that was never recorded
/// is its own root and stays outside the graph.
#[derive(Clone, Debug, Default)]
pub struct AliasGraph {
    parent: HashMap<String, String>,
}

impl AliasGraph {
    pub fn new() -> AliasGraph {
        AliasGraph::default()
    }

    /// Whether `name` participates in any recorded equivalence.
    pub fn contains(&self, name: &str) -> bool {
        self.parent.contains_key(name)
    }

    /// The representative of `name`'s class, compressing the walked chain.
    pub fn find(&mut self, name: &str) -> String {
        let mut root = name.to_string();
        while let Some(next) = self.parent.get(&root) {
            if *next == root {
                break;
            }
            root = next.clone();
        }
        if root != name {
            let mut current = name.to_string();
            while current != root {
                match self.parent.insert(current, root.clone()) {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
        root
    }

    /// Records the edge `name → find(target)`.
    pub fn record(&mut self, name: &str, target: &str) {
        let root = self.find(target);
        self.parent.insert(name.to_string(), root);
    }

    /// Makes `name` the representative of its own class.
    pub fn make_root(&mut self, name: &str) {
        self.parent.insert(name.to_string(), name.to_string());
    }

    pub fn same_class(&mut self, a: &str, b: &str) -> bool {
        self.find(a) == self.find(b)
    }

    /// Fully-compressed snapshot of every recorded name, for comparisons.
    pub fn classes(&mut self) -> BTreeMap<String, String> {
        let names: Vec<String> = self.parent.keys().cloned().collect();
        names
            .into_iter()
            .map(|name| {
                let root = self.find(&name);
                (name, root)
            })
            .collect()
    }
}
