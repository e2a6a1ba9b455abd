/// User actions that can be performed in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move cursor up
    MoveUp,
    /// Move cursor down
    MoveDown,
    /// Move cursor up by a page
    PageUp,
    /// Move cursor down by a page
    PageDown,
    /// Go to first item
    GoToFirst,
    /// Go to last item
    GoToLast,
    /// Open the item under the cursor, or toggle it in edit mode
    Activate,
    /// Open the details screen of the file under the cursor
    ShowDetails,
    /// Enter or leave edit mode
    ToggleEditing,
    /// Select or deselect the item under the cursor (edit mode only)
    ToggleSelection,
    /// Request delete (show confirmation dialog)
    Delete,
    /// Confirm delete operation
    ConfirmDelete,
    /// Cancel delete operation
    CancelDelete,
    /// Finish with the current selection
    Choose,
    /// Start typing a search query
    StartSearch,
    /// Append a character to the search query
    SearchInput(char),
    /// Remove the last character of the search query
    SearchBackspace,
    /// Keep the query and return to the list
    SubmitSearch,
    /// Clear the query and return to the list
    CancelSearch,
    /// Switch between name and date order
    ToggleSort,
    /// Leave edit mode or go back to the previous screen
    GoBack,
    /// Show help overlay
    ShowHelp,
    /// Hide help overlay
    HideHelp,
    /// Quit the application
    Quit,
    /// No action (for tick events)
    Tick,
}
