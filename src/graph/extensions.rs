use crate::graph::{amplify::Amplify, node::GraphNode};

/// Fluent combinators for building voices
pub trait NodeExt: GraphNode + Sized {
    fn amplify<M: GraphNode>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn boxed(self) -> Box<dyn GraphNode>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: GraphNode> NodeExt for T {}
