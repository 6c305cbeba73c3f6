//! Demo data set: a small file-explorer style forest.

use crate::model::{Forest, TreeNode};

/// Four roots mixing expanded folders, collapsed folders, plain files and
/// nodes whose children have not been fetched yet.
pub fn sample_forest() -> Forest {
    Forest::from_roots([
        TreeNode::new("root-1", "Documents").expanded().with_children([
            TreeNode::new("doc-1", "Work").with_children([
                TreeNode::new("doc-1-1", "Project A.docx"),
                TreeNode::new("doc-1-2", "Budget 2026.xlsx"),
                TreeNode::new("doc-1-3", "Presentation.pptx"),
            ]),
            TreeNode::new("doc-2", "Personal").with_children([
                TreeNode::new("doc-2-1", "Resume.pdf"),
                TreeNode::new("doc-2-2", "Photos").lazy(),
            ]),
            TreeNode::new("doc-3", "Notes.txt"),
        ]),
        TreeNode::new("root-2", "Projects").expanded().with_children([
            TreeNode::new("proj-1", "Web Development").with_children([
                TreeNode::new("proj-1-1", "React App").lazy(),
                TreeNode::new("proj-1-2", "Vue Dashboard"),
            ]),
            TreeNode::new("proj-2", "Mobile Apps").lazy(),
        ]),
        TreeNode::new("root-3", "Downloads").with_children([
            TreeNode::new("down-1", "installer.exe"),
            TreeNode::new("down-2", "archive.zip"),
        ]),
        TreeNode::new("root-4", "Media").lazy(),
    ])
}
