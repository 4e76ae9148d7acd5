use fawn_animation::AnimationClip;

/// A drawable part of a model hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub has_mesh: bool,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_mesh: false,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mesh(mut self) -> Self {
        self.has_mesh = true;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ModelNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Visits every node depth-first, parents before children.
    pub fn traverse(&self, visit: &mut impl FnMut(&ModelNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |node| count += usize::from(node.has_mesh));
        count
    }
}

/// A loaded model: its part hierarchy plus its animation clips, in file order.
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub root: ModelNode,
    pub clips: Vec<AnimationClip>,
}

impl Asset {
    #[must_use]
    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|clip| clip.name.as_str()).collect()
    }

    /// Splits the asset so the hierarchy and the clips can have separate owners.
    #[must_use]
    pub fn into_parts(self) -> (ModelNode, Vec<AnimationClip>) {
        (self.root, self.clips)
    }
}
