//! Editing session state: the authoritative project plus a current-frame
//! cursor.
//!
//! Every successful mutation bumps [`CarouselEditor::generation`]. The
//! preview compares generations to throw away repaints that were started
//! against older state, and autosave uses the dirty flag.

use crate::frame::{Element, Frame, FramePatch};
use crate::project::{FrameDefaults, Margin, OutputSize, Project, ProjectError, Signature};
use crate::store::ProjectStore;

/// Mutable editing state for one project.
#[derive(Debug, Clone)]
pub struct CarouselEditor {
    project: Project,
    current: usize,
    generation: u64,
    dirty: bool,
}

impl CarouselEditor {
    /// Start editing an existing project. The cursor starts on the first
    /// frame.
    pub fn new(project: Project) -> Result<Self, ProjectError> {
        project.validate()?;
        Ok(Self {
            project,
            current: 0,
            generation: 0,
            dirty: false,
        })
    }

    /// Start editing a brand-new project. It is dirty until first saved.
    pub fn create(name: impl Into<String>, size: OutputSize) -> Self {
        Self {
            project: Project::new(name, size),
            current: 0,
            generation: 0,
            dirty: true,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Consume the editor, returning the project.
    pub fn into_project(self) -> Project {
        self.project
    }

    /// Index of the frame shown in the preview.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_frame(&self) -> &Frame {
        &self.project.frames[self.current]
    }

    pub fn frame_count(&self) -> usize {
        self.project.frames.len()
    }

    /// Counter bumped by every mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether there are changes not yet written to a store.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn changed(&mut self) {
        self.generation += 1;
        self.dirty = true;
        self.project.touch();
        debug_assert!(self.current < self.project.frames.len());
    }

    fn check_index(&self, index: usize) -> Result<(), ProjectError> {
        let len = self.project.frames.len();
        if index >= len {
            return Err(ProjectError::FrameIndexOutOfRange { index, len });
        }
        Ok(())
    }

    /// Append a frame seeded with the project defaults and move the cursor
    /// to it. Returns the new frame's index.
    pub fn add_frame(&mut self) -> usize {
        let frame = self.project.defaults.new_frame();
        self.project.frames.push(frame);
        self.current = self.project.frames.len() - 1;
        self.changed();
        tracing::debug!(index = self.current, "Frame added");
        self.current
    }

    /// Merge a partial attribute set into the current frame.
    pub fn update_current_frame(&mut self, patch: FramePatch) {
        if patch.is_empty() {
            return;
        }
        self.project.frames[self.current].apply(patch);
        self.changed();
    }

    /// Remove the frame at `index`.
    ///
    /// Removing the only remaining frame is rejected and leaves the project
    /// untouched.
    pub fn remove_frame(&mut self, index: usize) -> Result<Frame, ProjectError> {
        self.check_index(index)?;
        if self.project.frames.len() == 1 {
            tracing::info!("Refusing to remove the last frame");
            return Err(ProjectError::LastFrame);
        }

        let removed = self.project.frames.remove(index);
        if self.current > index || self.current >= self.project.frames.len() {
            self.current = self.current.saturating_sub(1);
        }
        self.changed();
        tracing::debug!(index, current = self.current, "Frame removed");
        Ok(removed)
    }

    /// Move the cursor.
    pub fn select_frame(&mut self, index: usize) -> Result<(), ProjectError> {
        self.check_index(index)?;
        if self.current != index {
            self.current = index;
            // selection changes what the preview shows, but not the record
            self.generation += 1;
        }
        Ok(())
    }

    /// Insert a copy of the frame at `index` right after it and select it.
    pub fn duplicate_frame(&mut self, index: usize) -> Result<usize, ProjectError> {
        self.check_index(index)?;
        let copy = self.project.frames[index].clone();
        self.project.frames.insert(index + 1, copy);
        self.current = index + 1;
        self.changed();
        Ok(self.current)
    }

    /// Reorder a frame. The cursor follows the frame it was on.
    pub fn move_frame(&mut self, from: usize, to: usize) -> Result<(), ProjectError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let selected_was_moved = self.current == from;
        let frame = self.project.frames.remove(from);
        self.project.frames.insert(to, frame);

        if selected_was_moved {
            self.current = to;
        } else if from < self.current && to >= self.current {
            self.current -= 1;
        } else if from > self.current && to <= self.current {
            self.current += 1;
        }
        self.changed();
        Ok(())
    }

    /// Append an overlay element to the current frame.
    pub fn add_element(&mut self, element: Element) {
        self.project.frames[self.current].elements.push(element);
        self.changed();
    }

    /// Remove an overlay element from the current frame by id.
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let elements = &mut self.project.frames[self.current].elements;
        let pos = elements.iter().position(|e| e.id == id)?;
        let removed = elements.remove(pos);
        self.changed();
        Some(removed)
    }

    pub fn set_signature(&mut self, signature: Option<Signature>) {
        self.project.signature = signature;
        self.changed();
    }

    pub fn set_margin(&mut self, margin: Margin) {
        self.project.margin = margin;
        self.changed();
    }

    /// Replace the defaults used for frames created from now on.
    pub fn set_defaults(&mut self, defaults: FrameDefaults) {
        self.project.defaults = defaults;
        self.changed();
    }

    pub fn set_size(&mut self, size: OutputSize) {
        self.project.size = size;
        self.changed();
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ProjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProjectError::ValidationError {
                message: "project name cannot be empty".to_string(),
            });
        }
        self.project.name = name;
        self.changed();
        Ok(())
    }

    /// Explicit save action.
    pub fn save(&mut self, store: &dyn ProjectStore) -> Result<(), ProjectError> {
        store.save(&self.project)?;
        self.dirty = false;
        tracing::info!(id = %self.project.id, "Project saved");
        Ok(())
    }

    /// Save only if something changed since the last save.
    /// Returns whether a write happened.
    pub fn autosave(&mut self, store: &dyn ProjectStore) -> Result<bool, ProjectError> {
        if !self.dirty {
            return Ok(false);
        }
        self.save(store)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::frame::ShapeKind;
    use crate::store::MemoryProjectStore;

    fn editor_with_frames(n: usize) -> CarouselEditor {
        let mut editor = CarouselEditor::create("Deck", OutputSize::Square);
        for i in 1..n {
            editor.add_frame();
            editor.update_current_frame(FramePatch::text(format!("slide {}", i + 1)));
        }
        editor.select_frame(0).unwrap();
        editor.update_current_frame(FramePatch::text("slide 1"));
        editor
    }

    fn texts(editor: &CarouselEditor) -> Vec<&str> {
        editor
            .project()
            .frames
            .iter()
            .map(|f| f.text.as_str())
            .collect()
    }

    #[test]
    fn test_add_frame_uses_defaults_and_moves_cursor() {
        let mut editor = CarouselEditor::create("Deck", OutputSize::Square);
        editor.set_defaults(FrameDefaults {
            background_color: Color::rgb(10, 20, 30),
            text_color: Color::rgb(200, 200, 200),
            font_family: "Lora".into(),
        });
        let idx = editor.add_frame();
        assert_eq!(idx, 1);
        assert_eq!(editor.current_index(), 1);
        let frame = editor.current_frame();
        assert_eq!(frame.background_color, Color::rgb(10, 20, 30));
        assert_eq!(frame.font_family, "Lora");
    }

    #[test]
    fn test_update_touches_only_current_frame() {
        let mut editor = editor_with_frames(3);
        editor.select_frame(1).unwrap();
        editor.update_current_frame(FramePatch {
            bold: Some(true),
            ..Default::default()
        });
        assert!(editor.project().frames[1].bold);
        assert!(!editor.project().frames[0].bold);
        assert!(!editor.project().frames[2].bold);
    }

    #[test]
    fn test_remove_last_frame_is_rejected() {
        let mut editor = CarouselEditor::create("Solo", OutputSize::Square);
        editor.update_current_frame(FramePatch::text("only"));
        let before = editor.project().clone();
        let generation = editor.generation();

        let result = editor.remove_frame(0);
        assert!(matches!(result, Err(ProjectError::LastFrame)));
        assert_eq!(editor.project(), &before);
        assert_eq!(editor.generation(), generation);
        assert_eq!(editor.current_index(), 0);
    }

    #[test]
    fn test_remove_clamps_cursor() {
        let mut editor = editor_with_frames(3);
        editor.select_frame(2).unwrap();
        editor.remove_frame(2).unwrap();
        assert_eq!(editor.current_index(), 1);
        assert_eq!(texts(&editor), vec!["slide 1", "slide 2"]);

        // removing a frame before the cursor keeps the cursor on the same frame
        let mut editor = editor_with_frames(3);
        editor.select_frame(2).unwrap();
        editor.remove_frame(0).unwrap();
        assert_eq!(editor.current_index(), 1);
        assert_eq!(editor.current_frame().text, "slide 3");
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut editor = editor_with_frames(2);
        assert!(matches!(
            editor.remove_frame(5),
            Err(ProjectError::FrameIndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_cursor_always_in_range() {
        let mut editor = editor_with_frames(4);
        let ops: [&dyn Fn(&mut CarouselEditor); 5] = [
            &|e: &mut CarouselEditor| {
                let _ = e.remove_frame(e.frame_count() - 1);
            },
            &|e: &mut CarouselEditor| {
                e.add_frame();
            },
            &|e: &mut CarouselEditor| {
                let _ = e.move_frame(0, e.frame_count() - 1);
            },
            &|e: &mut CarouselEditor| {
                let _ = e.duplicate_frame(0);
            },
            &|e: &mut CarouselEditor| {
                let _ = e.remove_frame(0);
            },
        ];
        for round in 0..20 {
            ops[round % ops.len()](&mut editor);
            assert!(editor.current_index() < editor.frame_count());
        }
    }

    #[test]
    fn test_move_frame_cursor_follows() {
        let mut editor = editor_with_frames(4);
        editor.select_frame(1).unwrap();
        editor.move_frame(1, 3).unwrap();
        assert_eq!(editor.current_index(), 3);
        assert_eq!(texts(&editor), vec!["slide 1", "slide 3", "slide 4", "slide 2"]);

        editor.select_frame(2).unwrap();
        editor.move_frame(0, 3).unwrap();
        assert_eq!(editor.current_frame().text, "slide 4");
    }

    #[test]
    fn test_duplicate_frame() {
        let mut editor = editor_with_frames(2);
        let idx = editor.duplicate_frame(0).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(texts(&editor), vec!["slide 1", "slide 1", "slide 2"]);
    }

    #[test]
    fn test_elements_on_current_frame() {
        let mut editor = editor_with_frames(2);
        editor.select_frame(1).unwrap();
        editor.add_element(Element::shape("star", ShapeKind::Star, 0.0, 0.0, 40.0, 40.0));
        assert_eq!(editor.current_frame().elements.len(), 1);
        assert!(editor.project().frames[0].elements.is_empty());
        assert!(editor.remove_element("star").is_some());
        assert!(editor.remove_element("star").is_none());
    }

    #[test]
    fn test_generation_bumps_on_mutation() {
        let mut editor = editor_with_frames(1);
        let g0 = editor.generation();
        editor.update_current_frame(FramePatch::text("changed"));
        assert!(editor.generation() > g0);

        let g1 = editor.generation();
        editor.update_current_frame(FramePatch::default());
        assert_eq!(editor.generation(), g1);
    }

    #[test]
    fn test_autosave_only_when_dirty() {
        let store = MemoryProjectStore::new();
        let mut editor = editor_with_frames(2);
        assert!(editor.autosave(&store).unwrap());
        assert!(!editor.is_dirty());
        assert!(!editor.autosave(&store).unwrap());

        editor.update_current_frame(FramePatch::text("edited"));
        assert!(editor.autosave(&store).unwrap());

        let stored = store.load(&editor.project().id).unwrap().unwrap();
        assert_eq!(stored.frames[0].text, "edited");
    }

    #[test]
    fn test_rename_rejects_blank() {
        let mut editor = editor_with_frames(1);
        assert!(editor.rename("   ").is_err());
        editor.rename("Spring Promo").unwrap();
        assert_eq!(editor.project().name, "Spring Promo");
    }
}
