//! 프레임 캐시.
//!
//! 줄 인덱스 → `{top?, front?}` 부분 레코드. 세션 동안 키는 늘어나기만 하고,
//! 슬롯은 덮어쓸 수는 있어도 개별 삭제는 없다.
//! 덮어쓰인 이전 핸들은 호출자에게 돌려주며, 호출자가 해제한다.

use framesync_core::models::frame::{FrameEntry, ImageHandle};
use framesync_core::models::view::View;
use std::collections::BTreeMap;

/// 한 줄의 뷰별 슬롯
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSlots {
    pub top: Option<ImageHandle>,
    pub front: Option<ImageHandle>,
}

impl FrameSlots {
    pub fn get(&self, view: View) -> Option<&ImageHandle> {
        match view {
            View::Top => self.top.as_ref(),
            View::Front => self.front.as_ref(),
        }
    }

    fn slot_mut(&mut self, view: View) -> &mut Option<ImageHandle> {
        match view {
            View::Top => &mut self.top,
            View::Front => &mut self.front,
        }
    }

    /// 채워진 슬롯만 `(view, handle)`로 순회
    pub fn iter(&self) -> impl Iterator<Item = (View, &ImageHandle)> {
        View::ALL
            .into_iter()
            .filter_map(|view| self.get(view).map(|handle| (view, handle)))
    }

    /// 채워진 슬롯 수 (0..=2)
    pub fn filled(&self) -> usize {
        View::ALL.iter().filter(|v| self.get(**v).is_some()).count()
    }
}

/// `(index, view)` 키의 프레임 캐시
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameCache {
    slots: BTreeMap<usize, FrameSlots>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 슬롯 기록. 같은 슬롯에 있던 이전 핸들을 반환 (호출자가 해제)
    pub fn insert(&mut self, entry: FrameEntry) -> Option<ImageHandle> {
        let slots = self.slots.entry(entry.index).or_default();
        slots.slot_mut(entry.view).replace(entry.handle)
    }

    pub fn get(&self, index: usize, view: View) -> Option<&ImageHandle> {
        self.slots.get(&index).and_then(|s| s.get(view))
    }

    /// 줄의 레코드. 아직 어떤 뷰도 도착하지 않았으면 None
    pub fn slots(&self, index: usize) -> Option<&FrameSlots> {
        self.slots.get(&index)
    }

    /// 레코드가 있는 줄 수
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 채워진 슬롯 총수
    pub fn filled_slots(&self) -> usize {
        self.slots.values().map(FrameSlots::filled).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &FrameSlots)> {
        self.slots.iter().map(|(i, s)| (*i, s))
    }

    /// 세션 종료: 모든 핸들을 꺼내고 캐시를 비운다
    pub fn drain_handles(&mut self) -> Vec<ImageHandle> {
        std::mem::take(&mut self.slots)
            .into_values()
            .flat_map(|s| [s.top, s.front])
            .flatten()
            .collect()
    }
}
