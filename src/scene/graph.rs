//! Scene graph for the decoded studio asset.
//!
//! The hierarchy is plain data: nodes carry a name, a kind, a local
//! transform, zero or more primitives referencing shared meshes and
//! materials, and their children. GPU resources live in a separate
//! [`SceneGpu`] attached to the root, so a [`SceneRoot`] can also exist
//! *detached* (no GPU side) — the floor pass and tests operate on the data
//! alone, and syncing a detached root is a no-op.

use cgmath::{Matrix4, SquareMatrix};

use crate::scene::{
    material::{MaterialGpu, MaterialRecord, MaterialUniform},
    mesh::GpuMesh,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Mesh,
    Group,
}

/// One drawable primitive of a mesh node. `mesh` indexes the root's shared
/// mesh list; `material` indexes the shared material list, or is `None` for
/// the glTF default material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Primitive {
    pub mesh: usize,
    pub material: Option<usize>,
}

#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Matrix4<f32>,
    pub primitives: Vec<Primitive>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group,
            transform: Matrix4::identity(),
            primitives: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, primitives: Vec<Primitive>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Mesh,
            transform: Matrix4::identity(),
            primitives,
            children: Vec::new(),
        }
    }

    /// Visit this node and all descendants, depth first.
    pub fn visit(&self, f: &mut impl FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

/// Uniform carrying a node's world transform into the vertex shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
}

#[derive(Debug)]
pub(crate) struct NodeGpu {
    #[allow(unused)]
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// A flattened draw: one primitive with its resolved world transform.
#[derive(Debug)]
pub(crate) struct DrawItem {
    pub mesh: usize,
    pub material: Option<usize>,
    pub node: usize,
}

#[derive(Debug)]
pub(crate) struct SceneGpu {
    pub meshes: Vec<GpuMesh>,
    pub materials: Vec<MaterialGpu>,
    pub default_material: MaterialGpu,
    pub nodes: Vec<NodeGpu>,
    pub draws: Vec<DrawItem>,
}

/// Root of a decoded studio scene: the node hierarchy, the shared material
/// records, and (when attached) the GPU resources to render them.
#[derive(Debug)]
pub struct SceneRoot {
    pub root: SceneNode,
    pub materials: Vec<MaterialRecord>,
    gpu: Option<SceneGpu>,
}

impl SceneRoot {
    /// A root without GPU resources. Used for tests and as the defensive
    /// stand-in when a scene outlives its viewport.
    pub fn detached(root: SceneNode, materials: Vec<MaterialRecord>) -> Self {
        Self {
            root,
            materials,
            gpu: None,
        }
    }

    pub(crate) fn attached(
        root: SceneNode,
        materials: Vec<MaterialRecord>,
        gpu: SceneGpu,
    ) -> Self {
        Self {
            root,
            materials,
            gpu: Some(gpu),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.gpu.is_some()
    }

    /// Push every dirty material record to its uniform buffer.
    ///
    /// No-op on a detached root.
    pub fn sync(&mut self, queue: &wgpu::Queue) {
        let Some(gpu) = &self.gpu else {
            log::debug!("sync on a detached scene root, nothing to do");
            return;
        };
        for (record, gpu_mat) in self.materials.iter_mut().zip(&gpu.materials) {
            if record.needs_update {
                let uniform = MaterialUniform::from(&*record);
                queue.write_buffer(&gpu_mat.buffer, 0, bytemuck::cast_slice(&[uniform]));
                record.needs_update = false;
            }
        }
    }

    /// Record all draws into `render_pass`. The caller has already set the
    /// pipeline and the camera and light bind groups.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        for item in &gpu.draws {
            let mesh = &gpu.meshes[item.mesh];
            let material = match item.material {
                Some(idx) => &gpu.materials[idx],
                None => &gpu.default_material,
            };
            render_pass.set_bind_group(0, &material.bind_group, &[]);
            render_pass.set_bind_group(3, &gpu.nodes[item.node].bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_reaches_every_descendant_depth_first() {
        let mut root = SceneNode::group("root");
        let mut left = SceneNode::group("left");
        left.children.push(SceneNode::mesh("leaf", Vec::new()));
        root.children.push(left);
        root.children.push(SceneNode::group("right"));

        let mut names = Vec::new();
        root.visit(&mut |node| names.push(node.name.clone()));
        assert_eq!(names, ["root", "left", "leaf", "right"]);
    }
}
