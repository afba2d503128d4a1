pub(crate) mod builder;
mod node;
mod nodes;
mod primitive;
pub(crate) mod serializer;

use glam::Vec3;
use prism_gpu as gpu;

pub use self::node::*;
pub use self::nodes::*;
pub use self::primitive::*;
use crate::{utils, BoundingBox, BuildError, BvhConfig, Result, Vertex};

/// Bounding volume hierarchy over a triangle mesh, laid out as a flat array
/// that can be uploaded to the GPU as-is.
///
/// Each leaf holds exactly one triangle, identified by the position of its
/// first index within the index buffer (so triangle `n` is `3 * n`).
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: BvhNodes,
    buffer: Vec<gpu::BvhNode>,
    primitives: usize,
}

impl Bvh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for [`Self::init()`] on a fresh instance.
    pub fn build<V>(vertices: &[V], indices: &[u32]) -> Result<Self>
    where
        V: Vertex,
    {
        let mut this = Self::new();

        this.init(vertices, indices)?;

        Ok(this)
    }

    /// (Re)builds the tree for given mesh, using the default configuration.
    ///
    /// `indices` are consumed in groups of three, one group per triangle.
    pub fn init<V>(&mut self, vertices: &[V], indices: &[u32]) -> Result<()>
    where
        V: Vertex,
    {
        self.init_ex(vertices, indices, &Default::default())
    }

    /// (Re)builds the tree for given mesh.
    ///
    /// Whatever was built before gets dropped, even if this build fails.
    pub fn init_ex<V>(
        &mut self,
        vertices: &[V],
        indices: &[u32],
        config: &BvhConfig,
    ) -> Result<()>
    where
        V: Vertex,
    {
        self.clear();

        log::info!(
            "Building BVH; vertices = {}, triangles = {}",
            vertices.len(),
            indices.len() / 3,
        );

        let mut primitives = utils::measure("bvh-primitives", || {
            Self::primitives(vertices, indices)
        })?;

        let primitives_len = primitives.len();

        let result = utils::measure("bvh-build", || {
            builder::run(&mut self.nodes, &mut primitives, config)
        })
        .and_then(|_| {
            if config.validate {
                self.nodes.validate(primitives_len)
            } else {
                Ok(())
            }
        });

        if let Err(err) = result {
            self.clear();

            return Err(err);
        }

        utils::measure("bvh-serialize", || {
            serializer::run(&self.nodes, &mut self.buffer);
        });

        self.primitives = primitives_len;

        log::debug!("BVH built; nodes = {}", self.buffer.len());

        Ok(())
    }

    fn primitives<V>(
        vertices: &[V],
        indices: &[u32],
    ) -> Result<Vec<BvhPrimitive>>
    where
        V: Vertex,
    {
        if indices.len() % 3 != 0 {
            return Err(BuildError::InvalidIndexCount { len: indices.len() });
        }

        if indices.is_empty() {
            return Err(BuildError::NoPrimitives);
        }

        let position = |index: u32| -> Result<Vec3> {
            let vertex = vertices.get(index as usize).ok_or(
                BuildError::IndexOutOfBounds {
                    index,
                    vertex_count: vertices.len(),
                },
            )?;

            let position = vertex.position();

            if position.is_finite() {
                Ok(position)
            } else {
                Err(BuildError::NonFinitePosition { vertex: index })
            }
        };

        indices
            .chunks_exact(3)
            .enumerate()
            .map(|(triangle_idx, triangle)| {
                let positions = [
                    position(triangle[0])?,
                    position(triangle[1])?,
                    position(triangle[2])?,
                ];

                Ok(BvhPrimitive::from_triangle(
                    (triangle_idx * 3) as u32,
                    positions,
                ))
            })
            .collect()
    }

    /// Returns the packed nodes, with the root at index zero.
    pub fn root(&self) -> &[gpu::BvhNode] {
        &self.buffer
    }

    /// Returns the number of nodes.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buffer)
    }

    /// Returns the same tree as [`Self::root()`], but with leaves and internal
    /// nodes told apart by type instead of by their child indices.
    pub fn nodes(&self) -> &BvhNodes {
        &self.nodes
    }

    /// Returns bounds of the entire mesh; empty if nothing's been built.
    pub fn bounds(&self) -> BoundingBox {
        self.nodes
            .root()
            .map(|root| root.bounds())
            .unwrap_or_default()
    }

    /// Checks the tree's invariants against the mesh it was built from; see
    /// [`BvhNodes::validate()`].
    pub fn validate(&self) -> Result<()> {
        self.nodes.validate(self.primitives)
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.buffer = Default::default();
        self.primitives = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use glam::vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::EmptySplitFallback;

    /// Returns a mesh of `n` triangles, each a bit further along X.
    fn strip(n: usize) -> (Vec<Vec3>, Vec<u32>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for i in 0..n {
            let x = i as f32;

            indices.push(vertices.len() as u32);
            indices.push(vertices.len() as u32 + 1);
            indices.push(vertices.len() as u32 + 2);

            vertices.push(vec3(x, 0.0, 0.0));
            vertices.push(vec3(x + 0.5, 0.0, 0.0));
            vertices.push(vec3(x, 0.5, 0.25));
        }

        (vertices, indices)
    }

    fn random_mesh(
        rng: &mut StdRng,
        triangles: usize,
    ) -> (Vec<Vec3>, Vec<u32>) {
        let vertices: Vec<_> = (0..(triangles + 2))
            .map(|_| {
                vec3(
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-50.0..50.0),
                )
            })
            .collect();

        let indices = (0..(3 * triangles))
            .map(|_| rng.gen_range(0..vertices.len()) as u32)
            .collect();

        (vertices, indices)
    }

    /// Checks all of the tree's invariants through its packed form.
    fn assert_well_formed(target: &Bvh, vertices: &[Vec3], indices: &[u32]) {
        let triangles = indices.len() / 3;
        let nodes = target.root();

        assert_eq!(2 * triangles - 1, target.size());
        assert_eq!(Ok(()), target.validate());

        let mut leaves = BTreeSet::new();

        for (id, node) in nodes.iter().enumerate() {
            let bounds = BoundingBox::new(node.aabb_min, node.aabb_max);

            if node.is_leaf() {
                assert!(
                    leaves.insert(node.index),
                    "duplicated leaf: {}",
                    node.index
                );

                let first = node.index as usize;

                for &index in &indices[first..first + 3] {
                    let vertex = vertices[index as usize];

                    assert!(
                        bounds.contains(BoundingBox::from_points([vertex]))
                    );
                }
            } else {
                for child in [node.left_child, node.right_child] {
                    assert!((child as usize) > id);

                    let child = nodes[child as usize];

                    assert!(bounds.contains(BoundingBox::new(
                        child.aabb_min,
                        child.aabb_max
                    )));
                }
            }
        }

        let expected: BTreeSet<_> =
            (0..triangles).map(|triangle| (3 * triangle) as u32).collect();

        assert_eq!(expected, leaves);
    }

    #[test]
    fn single_triangle() {
        let vertices = [
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 2.0, 3.0),
        ];

        let target = Bvh::build(&vertices, &[0, 1, 2]).unwrap();

        assert_eq!(1, target.size());
        assert_eq!(
            &[gpu::BvhNode::leaf(Vec3::ZERO, vec3(1.0, 2.0, 3.0), 0)],
            target.root()
        );

        assert!(target.nodes().root().unwrap().is_leaf());
    }

    #[test]
    fn four_triangles_along_x() {
        let (vertices, indices) = strip(4);
        let target = Bvh::build(&vertices, &indices).unwrap();

        assert_eq!(7, target.size());
        assert_eq!(
            4,
            target.root().iter().filter(|node| node.is_leaf()).count()
        );

        let root = target.root()[0];

        assert_eq!(Vec3::ZERO, root.aabb_min);
        assert_eq!(vec3(3.5, 0.5, 0.25), root.aabb_max);

        // Root has been split along X, so its children don't overlap on it
        let left = target.root()[root.left_child as usize];
        let right = target.root()[root.right_child as usize];

        assert_eq!(1.5, left.aabb_max.x);
        assert_eq!(2.0, right.aabb_min.x);
        assert_eq!(0.5, left.aabb_max.y);
        assert_eq!(0.5, right.aabb_max.y);

        assert_well_formed(&target, &vertices, &indices);
    }

    #[test]
    fn coincident_triangles() {
        let vertices = [
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ];

        let indices = [0, 1, 2, 0, 1, 2];

        let config = BvhConfig {
            // Identical centroids are handled by their own fallback, so this
            // one must never trigger
            empty_split: EmptySplitFallback::Fail,
            validate: true,
        };

        let mut target = Bvh::new();

        target.init_ex(&vertices, &indices, &config).unwrap();

        assert_eq!(3, target.size());

        let nodes = target.root();

        assert_eq!((1, 2), (nodes[0].left_child, nodes[0].right_child));
        assert!(nodes[1].is_leaf());
        assert!(nodes[2].is_leaf());

        let mut leaves = [nodes[1].index, nodes[2].index];

        leaves.sort_unstable();

        assert_eq!([0, 3], leaves);
    }

    #[test]
    fn many_coincident_triangles() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let indices: Vec<_> = [0, 1, 2].repeat(100);

        let target = Bvh::build(&vertices, &indices).unwrap();

        assert_well_formed(&target, &vertices, &indices);
    }

    #[test]
    fn random_meshes() {
        let mut rng = StdRng::seed_from_u64(1234);

        for triangles in [1, 2, 3, 5, 17, 64, 250, 1000] {
            let (vertices, indices) = random_mesh(&mut rng, triangles);
            let target = Bvh::build(&vertices, &indices).unwrap();

            assert_well_formed(&target, &vertices, &indices);
        }
    }

    #[test]
    fn reinit() {
        let (vertices, indices) = strip(8);
        let mut target = Bvh::build(&vertices, &indices).unwrap();

        assert_eq!(15, target.size());

        let (vertices, indices) = strip(2);

        target.init(&vertices, &indices).unwrap();

        assert_eq!(3, target.size());
        assert_eq!(3, target.nodes().len());
        assert_well_formed(&target, &vertices, &indices);

        // A failed build doesn't leave the previous tree behind
        assert!(target.init(&vertices, &indices[..4]).is_err());
        assert!(target.is_empty());
        assert!(target.nodes().is_empty());
        assert!(target.bounds().is_empty());
        assert_eq!(Ok(()), target.validate());
    }

    #[test]
    fn validate_against_mesh() {
        let (vertices, indices) = strip(2);
        let mut target = Bvh::build(&vertices, &indices).unwrap();

        assert_eq!(Ok(()), target.validate());

        // Drop one of the triangles; the remaining tree is well-formed on its
        // own, but doesn't cover the mesh anymore
        let bounds = target.nodes[BvhNodeId::new(1)].bounds();

        target.nodes.reset(1);

        let root_id = target.nodes.add(bounds);

        target.nodes[root_id] = BvhNode::Leaf {
            bounds,
            primitive_id: 0,
        };

        assert_eq!(
            Err(BuildError::NodeCountMismatch {
                expected: 3,
                actual: 1
            }),
            target.validate()
        );
    }

    #[test]
    fn extreme_coordinates() {
        let far = f32::MAX;

        let vertices = [
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            vec3(far, 0.0, 0.0),
            vec3(far, 1.0, 0.0),
            vec3(far, 0.0, 1.0),
        ];

        let indices = [0, 1, 2, 3, 4, 5];

        let config = BvhConfig {
            empty_split: EmptySplitFallback::Fail,
            validate: true,
        };

        let mut target = Bvh::new();

        target.init_ex(&vertices, &indices, &config).unwrap();

        assert_eq!(vec3(far, 1.0, 1.0), target.bounds().max());

        for node in target.root() {
            assert!(node.aabb_min.cmple(node.aabb_max).all());
        }

        assert_well_formed(&target, &vertices, &indices);
    }

    #[test]
    fn huge_coordinates() {
        // Summing these up as f32 would overflow into infinity
        let vertices: Vec<_> = [-3.0e38, -2.0e38, 2.0e38, 3.0e38]
            .into_iter()
            .flat_map(|x| {
                [vec3(x, 0.0, 0.0), vec3(x, 1.0, 0.0), vec3(x, 0.0, 1.0)]
            })
            .collect();

        let indices: Vec<_> = (0..vertices.len() as u32).collect();

        let config = BvhConfig {
            empty_split: EmptySplitFallback::Fail,
            validate: true,
        };

        let mut target = Bvh::new();

        target.init_ex(&vertices, &indices, &config).unwrap();

        assert_eq!(7, target.size());
        assert_eq!(-3.0e38, target.bounds().min().x);
        assert_eq!(3.0e38, target.bounds().max().x);

        assert_well_formed(&target, &vertices, &indices);
    }

    #[test]
    fn bytes() {
        let (vertices, indices) = strip(3);
        let target = Bvh::build(&vertices, &indices).unwrap();

        assert_eq!(5 * 32, target.as_bytes().len());

        let view = gpu::BvhView::from_bytes(target.as_bytes()).unwrap();

        let mut leaves = view.leaves();

        leaves.sort_unstable();

        assert_eq!(vec![0, 3, 6], leaves);
    }

    #[test]
    fn vertex_types() {
        let vertices = [[0.0f32, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 0.0, 0.0]];
        let target = Bvh::build(&vertices, &[0, 1, 2]).unwrap();

        assert_eq!(vec3(2.0, 1.0, 1.0), target.bounds().max());

        let vertices = [
            Vec3::ZERO.extend(1.0),
            Vec3::ONE.extend(1.0),
            Vec3::X.extend(1.0),
        ];
        let target = Bvh::build(&vertices, &[0, 1, 2]).unwrap();

        assert_eq!(Vec3::ONE, target.bounds().max());
    }

    #[test]
    fn errors() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Y];

        assert_eq!(
            Err(BuildError::InvalidIndexCount { len: 4 }),
            Bvh::build(&vertices, &[0, 1, 2, 0]).map(|_| ())
        );

        assert_eq!(
            Err(BuildError::NoPrimitives),
            Bvh::build(&vertices, &[]).map(|_| ())
        );

        assert_eq!(
            Err(BuildError::IndexOutOfBounds {
                index: 3,
                vertex_count: 3
            }),
            Bvh::build(&vertices, &[0, 1, 3]).map(|_| ())
        );

        let vertices = [Vec3::ZERO, Vec3::X, vec3(f32::NAN, 0.0, 0.0)];

        assert_eq!(
            Err(BuildError::NonFinitePosition { vertex: 2 }),
            Bvh::build(&vertices, &[0, 1, 2]).map(|_| ())
        );

        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let indices = [0, 1, 2].repeat(gpu::BvhNode::MAX_PRIMITIVES + 1);

        assert!(matches!(
            Bvh::build(&vertices, &indices),
            Err(BuildError::TooManyPrimitives { .. })
        ));
    }
}
