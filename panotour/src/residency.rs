use crate::model::{DeviceClass, LoadRequest, LoadState, Node, Resolution};
use log::{debug, warn};

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    state: LoadState,
    created: bool,
    visible: bool,
    generation: u64,
}

/// Keeps the relevant subset of node imagery resident. Loading is
/// progressive (low first, then high), releases are idempotent, and each
/// slot carries a generation counter so completions that raced a release
/// are discarded instead of resurrecting a released node.
#[derive(Clone, Debug, Default)]
pub struct Residency {
    slots: Vec<Slot>,
    queue: Vec<LoadRequest>,
    device: DeviceClass,
}

impl Residency {
    pub fn new(capacity: usize, device: DeviceClass) -> Residency {
        Residency {
            slots: vec![Slot::default(); capacity],
            queue: Vec::new(),
            device,
        }
    }

    fn high_url(&self, node: &Node) -> String {
        match self.device {
            DeviceClass::Mobile => node
                .url_mid
                .clone()
                .unwrap_or_else(|| node.url_high.clone()),
            DeviceClass::Desktop => node.url_high.clone(),
        }
    }

    /// Begin materializing a node: the visual container exists from here on
    /// and the low-resolution fetch is queued. No-op if already created.
    pub fn request_load(&mut self, node: &Node) {
        let Some(slot) = self.slots.get_mut(node.id as usize) else { return };
        if slot.created {
            return;
        }
        slot.created = true;
        debug!("loading node {}", node.id);
        self.queue.push(LoadRequest {
            node: node.id,
            resolution: Resolution::Low,
            url: node.url_low.clone(),
            generation: slot.generation,
        });
    }

    /// Install a finished fetch. Returns false when the completion is stale
    /// (generation mismatch after a release) or arrives out of order; stale
    /// completions never mutate the slot.
    pub fn complete_load(&mut self, node: &Node, resolution: Resolution, generation: u64) -> bool {
        let Some(slot) = self.slots.get_mut(node.id as usize) else { return false };
        if !slot.created || generation != slot.generation {
            debug!("discarding stale {:?} completion for node {}", resolution, node.id);
            return false;
        }
        match resolution {
            Resolution::Low => {
                if slot.state != LoadState::Unloaded {
                    return false;
                }
                slot.state = LoadState::LowLoaded;
                // low confirmed; chain the high-resolution fetch
                let url = self.high_url(node);
                self.queue.push(LoadRequest {
                    node: node.id,
                    resolution: Resolution::High,
                    url,
                    generation,
                });
                true
            }
            Resolution::High => {
                if slot.state != LoadState::LowLoaded {
                    debug!("discarding high completion for node {} in {:?}", node.id, slot.state);
                    return false;
                }
                slot.state = LoadState::HighLoaded;
                true
            }
        }
    }

    /// Idempotent: releasing an unloaded node is a no-op. Bumps the slot
    /// generation so in-flight fetches for the old incarnation are ignored.
    pub fn release(&mut self, id: u32) {
        let Some(slot) = self.slots.get_mut(id as usize) else { return };
        if !slot.created {
            return;
        }
        debug!("releasing node {}", id);
        slot.created = false;
        slot.visible = false;
        slot.state = LoadState::Unloaded;
        slot.generation += 1;
    }

    /// Release every created slot not named in `keep`.
    pub fn retain_exactly(&mut self, keep: &[u32]) {
        for id in 0..self.slots.len() as u32 {
            if self.slots[id as usize].created && !keep.contains(&id) {
                self.release(id);
            }
        }
    }

    /// Displayable once at least low-resolution imagery is installed and the
    /// visual container exists.
    pub fn is_displayable(&self, id: u32) -> bool {
        self.slots
            .get(id as usize)
            .map_or(false, |s| s.created && s.state != LoadState::Unloaded)
    }

    pub fn is_resident(&self, id: u32) -> bool {
        self.slots.get(id as usize).map_or(false, |s| s.created)
    }

    pub fn load_state(&self, id: u32) -> LoadState {
        self.slots.get(id as usize).map_or(LoadState::Unloaded, |s| s.state)
    }

    pub fn is_visible(&self, id: u32) -> bool {
        self.slots.get(id as usize).map_or(false, |s| s.visible)
    }

    pub fn set_visible(&mut self, id: u32, visible: bool) {
        if let Some(slot) = self.slots.get_mut(id as usize) {
            if visible && !slot.created {
                warn!("node {} made visible before any load request", id);
            }
            slot.visible = visible;
        }
    }

    pub fn generation(&self, id: u32) -> u64 {
        self.slots.get(id as usize).map_or(0, |s| s.generation)
    }

    /// Drain the pending fetch orders for the host loader.
    pub fn take_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.queue)
    }
}
