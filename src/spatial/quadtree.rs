//! Barnes-Hut quadtree for O(n log n) many-body repulsion.
//!
//! Instead of summing repulsion over every pair of nodes, distant groups of
//! nodes are treated as a single body at their center of mass.

/// A node in the quadtree: empty, a leaf with one or more coincident
/// bodies, or an internal cell with four children.
#[derive(Debug, Default)]
enum QuadNode {
    #[default]
    Empty,
    Leaf {
        x: f32,
        y: f32,
        mass: f32,
        /// Slots of the bodies stored here (more than one only when they coincide).
        indices: Vec<usize>,
    },
    Internal {
        /// Center of mass of all bodies in this cell
        com_x: f32,
        com_y: f32,
        /// Total mass of all bodies in this cell
        total_mass: f32,
        /// Children: NW, NE, SW, SE
        children: Box<[QuadNode; 4]>,
    },
}

/// Square axis-aligned cell.
#[derive(Debug, Clone, Copy)]
struct Cell {
    min_x: f32,
    min_y: f32,
    size: f32,
}

impl Cell {
    fn center(&self) -> (f32, f32) {
        let half = self.size / 2.0;
        (self.min_x + half, self.min_y + half)
    }

    /// Quadrant for a position (0=NW, 1=NE, 2=SW, 3=SE)
    fn quadrant(&self, x: f32, y: f32) -> usize {
        let (cx, cy) = self.center();
        let east = x >= cx;
        let south = y >= cy;
        match (south, east) {
            (false, false) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (true, true) => 3,
        }
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x < self.min_x + self.size && y >= self.min_y && y < self.min_y + self.size
    }

    fn child(&self, quadrant: usize) -> Cell {
        let half = self.size / 2.0;
        let (dx, dy) = match quadrant {
            0 => (0.0, 0.0),
            1 => (half, 0.0),
            2 => (0.0, half),
            _ => (half, half),
        };
        Cell {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            size: half,
        }
    }
}

/// Depth past which coincident bodies share a leaf instead of splitting.
const MAX_DEPTH: u32 = 32;

/// A body to insert: slot, position and mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassPoint {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub mass: f32,
}

/// Barnes-Hut quadtree.
pub struct Quadtree {
    root: QuadNode,
    bounds: Cell,
    /// Cell size / distance threshold for approximation.
    /// Higher = faster but less accurate.
    theta: f32,
}

impl Quadtree {
    /// Build a quadtree over `bodies`.
    pub fn build(bodies: &[MassPoint], theta: f32) -> Self {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;

        for body in bodies {
            min_x = min_x.min(body.x);
            min_y = min_y.min(body.y);
            max_x = max_x.max(body.x);
            max_y = max_y.max(body.y);
        }

        if bodies.is_empty() {
            return Self {
                root: QuadNode::Empty,
                bounds: Cell { min_x: 0.0, min_y: 0.0, size: 0.0 },
                theta,
            };
        }

        // Square cell with a little slack so edge bodies fall strictly inside
        let size = (max_x - min_x).max(max_y - min_y).max(1.0) + 2.0;
        let bounds = Cell {
            min_x: min_x - 1.0,
            min_y: min_y - 1.0,
            size,
        };

        let mut tree = Self {
            root: QuadNode::Empty,
            bounds,
            theta,
        };

        for body in bodies {
            tree.root = Self::insert_into(std::mem::take(&mut tree.root), body, bounds, 0);
        }

        tree
    }

    fn insert_into(node: QuadNode, body: &MassPoint, cell: Cell, depth: u32) -> QuadNode {
        match node {
            QuadNode::Empty => QuadNode::Leaf {
                x: body.x,
                y: body.y,
                mass: body.mass,
                indices: vec![body.index],
            },

            QuadNode::Leaf {
                x,
                y,
                mass,
                mut indices,
            } => {
                if depth >= MAX_DEPTH || (x == body.x && y == body.y) {
                    indices.push(body.index);
                    return QuadNode::Leaf {
                        x,
                        y,
                        mass: mass + body.mass,
                        indices,
                    };
                }

                // Split: re-home the existing leaf, then insert the new body
                let mut children: Box<[QuadNode; 4]> = Box::default();
                let eq = cell.quadrant(x, y);
                children[eq] = QuadNode::Leaf { x, y, mass, indices };

                let nq = cell.quadrant(body.x, body.y);
                children[nq] =
                    Self::insert_into(std::mem::take(&mut children[nq]), body, cell.child(nq), depth + 1);

                let total_mass = mass + body.mass;
                QuadNode::Internal {
                    com_x: (x * mass + body.x * body.mass) / total_mass,
                    com_y: (y * mass + body.y * body.mass) / total_mass,
                    total_mass,
                    children,
                }
            }

            QuadNode::Internal {
                com_x,
                com_y,
                total_mass,
                mut children,
            } => {
                let q = cell.quadrant(body.x, body.y);
                children[q] =
                    Self::insert_into(std::mem::take(&mut children[q]), body, cell.child(q), depth + 1);

                let new_total = total_mass + body.mass;
                QuadNode::Internal {
                    com_x: (com_x * total_mass + body.x * body.mass) / new_total,
                    com_y: (com_y * total_mass + body.y * body.mass) / new_total,
                    total_mass: new_total,
                    children,
                }
            }
        }
    }

    /// Velocity change on body `index` at `(x, y)`.
    ///
    /// Each source contributes `Δ × strength × mass / max(d², min_distance²)`
    /// where `Δ` points from the body to the source; a negative `strength`
    /// therefore repels. Coincident sources are separated with `jiggle`.
    pub fn accumulate(
        &self,
        index: usize,
        x: f32,
        y: f32,
        strength: f32,
        min_distance: f32,
        jiggle: impl Fn(usize) -> (f32, f32),
    ) -> (f32, f32) {
        let query = Query {
            index,
            x,
            y,
            strength,
            min_distance_sq: min_distance * min_distance,
            theta: self.theta,
            jiggle: &jiggle,
        };
        query.visit(&self.root, self.bounds)
    }
}

struct Query<'a> {
    index: usize,
    x: f32,
    y: f32,
    strength: f32,
    min_distance_sq: f32,
    theta: f32,
    jiggle: &'a dyn Fn(usize) -> (f32, f32),
}

impl Query<'_> {
    fn visit(&self, node: &QuadNode, cell: Cell) -> (f32, f32) {
        match node {
            QuadNode::Empty => (0.0, 0.0),

            QuadNode::Leaf { x, y, indices, .. } => {
                let mut fx = 0.0;
                let mut fy = 0.0;
                for &other in indices {
                    if other == self.index {
                        continue;
                    }
                    let mut dx = x - self.x;
                    let mut dy = y - self.y;
                    if dx == 0.0 && dy == 0.0 {
                        let (jx, jy) = (self.jiggle)(self.index);
                        dx = jx;
                        dy = jy;
                    }
                    // Each body in a coincident leaf weighs its share of the leaf mass
                    let share = self.leaf_share(node);
                    let (ax, ay) = self.contribution(dx, dy, share);
                    fx += ax;
                    fy += ay;
                }
                (fx, fy)
            }

            QuadNode::Internal {
                com_x,
                com_y,
                total_mass,
                children,
            } => {
                let dx = com_x - self.x;
                let dy = com_y - self.y;
                let distance = (dx * dx + dy * dy).sqrt();

                if !cell.contains(self.x, self.y) && distance > 0.0 && cell.size / distance < self.theta {
                    return self.contribution(dx, dy, *total_mass);
                }

                let mut fx = 0.0;
                let mut fy = 0.0;
                for (q, child) in children.iter().enumerate() {
                    let (ax, ay) = self.visit(child, cell.child(q));
                    fx += ax;
                    fy += ay;
                }
                (fx, fy)
            }
        }
    }

    fn leaf_share(&self, node: &QuadNode) -> f32 {
        match node {
            QuadNode::Leaf { mass, indices, .. } if !indices.is_empty() => mass / indices.len() as f32,
            _ => 0.0,
        }
    }

    fn contribution(&self, dx: f32, dy: f32, mass: f32) -> (f32, f32) {
        let distance_sq = (dx * dx + dy * dy).max(self.min_distance_sq);
        if distance_sq <= 0.0 {
            return (0.0, 0.0);
        }
        let w = self.strength * mass / distance_sq;
        (dx * w, dy * w)
    }
}
