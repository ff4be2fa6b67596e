use crate::hierarchy::Hierarchy;
use serde::{Deserialize, Serialize};

/// Final coordinates for one hierarchy node.
///
/// `x` is the breadth axis (sibling spread), `y` the depth axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub depth: usize,
}

/// How preliminary layout units are mapped to output coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Sizing {
    /// d3 `tree.size([width, height])`: stretch the tree to fill the box.
    Fit { width: f64, height: f64 },
    /// d3 `tree.nodeSize([dx, dy])`: one separation unit is `dx`, one level is `dy`.
    NodeSize { dx: f64, dy: f64 },
}

impl Default for Sizing {
    fn default() -> Self {
        Sizing::Fit {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// d3's default separation: siblings are one unit apart, cousins two.
pub fn default_separation(h: &Hierarchy, a: usize, b: usize) -> f64 {
    if h.parent(a) == h.parent(b) { 1.0 } else { 2.0 }
}

#[derive(Debug, Clone, Default)]
pub struct TidyTree {
    pub sizing: Sizing,
}

#[derive(Debug, Clone, Copy)]
struct WalkState {
    /// Preliminary x.
    z: f64,
    /// Modifier.
    m: f64,
    /// Change.
    c: f64,
    /// Shift.
    s: f64,
    /// Contour thread.
    t: Option<usize>,
    /// Ancestor.
    a: usize,
    /// Default ancestor of this node's children.
    default_ancestor: Option<usize>,
    /// Sibling number.
    i: usize,
}

struct Walker<'a, F> {
    h: &'a Hierarchy,
    separation: F,
    st: Vec<WalkState>,
    /// Synthetic parent of the root, stored at index `h.len()`.
    virt: usize,
    root_siblings: [usize; 1],
}

impl TidyTree {
    pub fn fit(width: f64, height: f64) -> Self {
        Self {
            sizing: Sizing::Fit { width, height },
        }
    }

    pub fn node_size(dx: f64, dy: f64) -> Self {
        Self {
            sizing: Sizing::NodeSize { dx, dy },
        }
    }

    /// Lays out `h` with [`default_separation`]. The result is indexed like the hierarchy.
    pub fn layout(&self, h: &Hierarchy) -> Vec<Placement> {
        self.layout_with(h, default_separation)
    }

    pub fn layout_with<F>(&self, h: &Hierarchy, separation: F) -> Vec<Placement>
    where
        F: Fn(&Hierarchy, usize, usize) -> f64,
    {
        let n = h.len();
        let mut st: Vec<WalkState> = (0..=n)
            .map(|v| WalkState {
                z: 0.0,
                m: 0.0,
                c: 0.0,
                s: 0.0,
                t: None,
                a: v,
                default_ancestor: None,
                i: 0,
            })
            .collect();
        for v in 0..n {
            for (i, &child) in h.children(v).iter().enumerate() {
                st[child].i = i;
            }
        }

        let mut walker = Walker {
            h,
            separation,
            st,
            virt: n,
            root_siblings: [h.root()],
        };

        for v in h.postorder() {
            walker.first_walk(v);
        }
        let root = h.root();
        walker.st[walker.virt].m = -walker.st[root].z;

        let mut x = vec![0.0; n];
        for v in h.preorder() {
            let p = h.parent(v).unwrap_or(walker.virt);
            let pm = walker.st[p].m;
            x[v] = walker.st[v].z + pm;
            walker.st[v].m += pm;
        }

        match self.sizing {
            Sizing::NodeSize { dx, dy } => (0..n)
                .map(|v| Placement {
                    x: x[v] * dx,
                    y: h.depth(v) as f64 * dy,
                    depth: h.depth(v),
                })
                .collect(),
            Sizing::Fit { width, height } => {
                let mut left = root;
                let mut right = root;
                let mut bottom = root;
                for v in h.preorder() {
                    if x[v] < x[left] {
                        left = v;
                    }
                    if x[v] > x[right] {
                        right = v;
                    }
                    if h.depth(v) > h.depth(bottom) {
                        bottom = v;
                    }
                }
                let s = if left == right {
                    1.0
                } else {
                    (walker.separation)(h, left, right) / 2.0
                };
                let tx = s - x[left];
                let kx = width / (x[right] + s + tx);
                let ky = height / (h.depth(bottom).max(1) as f64);
                (0..n)
                    .map(|v| Placement {
                        x: (x[v] + tx) * kx,
                        y: h.depth(v) as f64 * ky,
                        depth: h.depth(v),
                    })
                    .collect()
            }
        }
    }
}

impl<F> Walker<'_, F>
where
    F: Fn(&Hierarchy, usize, usize) -> f64,
{
    fn sep(&self, a: usize, b: usize) -> f64 {
        (self.separation)(self.h, a, b)
    }

    fn siblings(&self, v: usize) -> &[usize] {
        match self.h.parent(v) {
            Some(p) => self.h.children(p),
            None => &self.root_siblings,
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.h.children(v).first().copied().or(self.st[v].t)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.h.children(v).last().copied().or(self.st[v].t)
    }

    fn first_walk(&mut self, v: usize) {
        let number = self.st[v].i;
        let w = if number > 0 {
            self.siblings(v).get(number - 1).copied()
        } else {
            None
        };
        let h = self.h;
        let children = h.children(v);
        if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
            self.execute_shifts(v);
            let midpoint = (self.st[first].z + self.st[last].z) / 2.0;
            if let Some(w) = w {
                self.st[v].z = self.st[w].z + self.sep(v, w);
                self.st[v].m = self.st[v].z - midpoint;
            } else {
                self.st[v].z = midpoint;
            }
        } else if let Some(w) = w {
            self.st[v].z = self.st[w].z + self.sep(v, w);
        }

        let parent_slot = self.h.parent(v).unwrap_or(self.virt);
        let leftmost = self.siblings(v).first().copied().unwrap_or(v);
        let ancestor = self.st[parent_slot].default_ancestor.unwrap_or(leftmost);
        let ancestor = self.apportion(v, w, ancestor, leftmost);
        self.st[parent_slot].default_ancestor = Some(ancestor);
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let h = self.h;
        for &w in h.children(v).iter().rev() {
            let s = &mut self.st[w];
            s.z += shift;
            s.m += shift;
            change += s.c;
            shift += s.s + change;
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let span = self.st[wp].i as f64 - self.st[wm].i as f64;
        let change = shift / span;
        self.st[wp].c -= change;
        self.st[wp].s += shift;
        self.st[wm].c += change;
        self.st[wp].z += shift;
        self.st[wp].m += shift;
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let a = self.st[vim].a;
        if self.h.parent(a) == self.h.parent(v) {
            a
        } else {
            ancestor
        }
    }

    fn apportion(&mut self, v: usize, w: Option<usize>, mut ancestor: usize, leftmost: usize) -> usize {
        let Some(w) = w else {
            return ancestor;
        };

        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = leftmost;
        let mut sip = self.st[vip].m;
        let mut sop = self.st[vop].m;
        let mut sim = self.st[vim].m;
        let mut som = self.st[vom].m;

        let mut next_im = self.next_right(vim);
        let mut next_ip = self.next_left(vip);
        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            vim = im;
            vip = ip;
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vom = om;
            vop = op;
            self.st[vop].a = v;

            let shift = self.st[vim].z + sim - self.st[vip].z - sip + self.sep(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.st[vim].m;
            sip += self.st[vip].m;
            som += self.st[vom].m;
            sop += self.st[vop].m;

            next_im = self.next_right(vim);
            next_ip = self.next_left(vip);
        }

        if let Some(im) = next_im {
            if self.next_right(vop).is_none() {
                self.st[vop].t = Some(im);
                self.st[vop].m += sim - sop;
            }
        }
        if let Some(ip) = next_ip {
            if self.next_left(vom).is_none() {
                self.st[vom].t = Some(ip);
                self.st[vom].m += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }
}
