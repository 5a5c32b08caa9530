/// Where a dragged entry is hovering or was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A row; file rows resolve to their parent folder
    Row(String),
    /// The open area under an expanded folder
    FolderBody(String),
    /// Empty space below the tree
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeMessage {
    // Navigation
    FolderClicked(String),
    FileClicked(String),
    DoubleClicked(String),
    Refresh,

    // Drag and drop
    DragStarted(String),
    DragOver(DropTarget),
    Dropped(DropTarget),
    DragEnded,

    // Context menu (`None` targets the root)
    ShowContextMenu(Option<String>),
    HideContextMenu,
    ContextCopy,
    ContextCut,
    ContextPaste,
    ContextDelete,
    ContextCopyPath,

    // Delete confirmation
    ConfirmDeleteYes,
    ConfirmDeleteCancel,

    // Inline create / rename
    CreateNewFile,
    CreateNewFolder,
    InputChanged(String),
    InputConfirm,
    InputBlur,
    InputCancel,
}
