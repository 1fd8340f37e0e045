//! The host page as the grid sees it: viewport containers, their captions, and the
//! framework tab bar

use crate::framework::Framework;

/// Number of container slots on the page
pub const MAX_CONTAINERS: usize = 12;

/// A page element a viewport renders into
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub width: u32,
    pub height: u32,
    /// Whether the element currently takes part in layout
    pub visible: bool,
    /// Text of the caption element following the container, if there is one
    pub caption: Option<String>,
    /// Set once a render surface has been attached
    pub has_surface: bool,
}

impl Container {
    /// Element id of the container in `slot` (zero based)
    pub fn id_for_slot(slot: usize) -> String {
        format!("mesh-container-{}", slot + 1)
    }

    pub fn new(slot: usize, width: u32, height: u32) -> Self {
        Self {
            id: Self::id_for_slot(slot),
            width,
            height,
            visible: true,
            caption: Some(String::new()),
            has_surface: false,
        }
    }

    /// A container without a caption element after it
    pub fn without_caption(mut self) -> Self {
        self.caption = None;
        self
    }
}

/// Up to [`MAX_CONTAINERS`] container slots; empty slots leave gaps in the grid
#[derive(Debug, Clone)]
pub struct PageLayout {
    slots: Vec<Option<Container>>,
    pub device_pixel_ratio: f32,
}

impl PageLayout {
    pub fn new(device_pixel_ratio: f32) -> Self {
        Self {
            slots: vec![None; MAX_CONTAINERS],
            device_pixel_ratio,
        }
    }

    /// All slots filled with visible, captioned containers of the same size
    pub fn full(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        let mut layout = Self::new(device_pixel_ratio);
        for slot in 0..MAX_CONTAINERS {
            layout.insert(slot, Container::new(slot, width, height));
        }
        layout
    }

    /// Place a container in `slot`; slots past the last one are ignored
    pub fn insert(&mut self, slot: usize, container: Container) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = Some(container);
        }
    }

    pub fn remove(&mut self, slot: usize) -> Option<Container> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn container(&self, slot: usize) -> Option<&Container> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn container_mut(&mut self, slot: usize) -> Option<&mut Container> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Present containers with their slot numbers
    pub fn containers(&self) -> impl Iterator<Item = (usize, &Container)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| c.as_ref().map(|c| (slot, c)))
    }

    pub fn is_visible(&self, slot: usize) -> bool {
        self.container(slot).is_some_and(|c| c.visible)
    }

    pub fn set_visible(&mut self, slot: usize, visible: bool) {
        if let Some(container) = self.container_mut(slot) {
            container.visible = visible;
        }
    }

    pub fn resize_container(&mut self, slot: usize, width: u32, height: u32) {
        if let Some(container) = self.container_mut(slot) {
            container.width = width;
            container.height = height;
        }
    }

    pub fn caption(&self, slot: usize) -> Option<&str> {
        self.container(slot).and_then(|c| c.caption.as_deref())
    }

    /// Write caption text; returns false when the slot has no caption element
    pub fn set_caption(&mut self, slot: usize, text: &str) -> bool {
        match self.container_mut(slot).and_then(|c| c.caption.as_mut()) {
            Some(caption) => {
                caption.clear();
                caption.push_str(text);
                true
            }
            None => false,
        }
    }
}

/// A selectable tab naming the framework it shows
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub label: String,
    /// Framework selector carried by the tab
    pub value: String,
    pub active: bool,
}

/// Tab bar with at most one active tab
#[derive(Debug, Clone, Default)]
pub struct TabBar {
    tabs: Vec<Tab>,
}

impl TabBar {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self { tabs }
    }

    /// One tab per known framework, the default framework active
    pub fn for_frameworks() -> Self {
        let tabs = Framework::ALL
            .iter()
            .map(|fw| Tab {
                label: fw.as_str().to_string(),
                value: fw.as_str().to_string(),
                active: *fw == Framework::DEFAULT,
            })
            .collect();
        Self { tabs }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.value == value)
    }

    /// Make `index` the only active tab and return its framework selector
    pub fn activate(&mut self, index: usize) -> Option<&str> {
        if index >= self.tabs.len() {
            return None;
        }
        for tab in &mut self.tabs {
            tab.active = false;
        }
        let tab = &mut self.tabs[index];
        tab.active = true;
        Some(tab.value.as_str())
    }
}
