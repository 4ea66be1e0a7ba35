//! The tool palette in the bottom-right corner: four buttons (terrain, coins,
//! enemies, palms), each cycling through the ids of its menu group. The palm
//! button carries foreground palms as its main set and background palms as an
//! alternate set toggled with the middle button.

use crate::catalog::{Catalog, MenuGroup, Style, TileId};
use dw_core::{MouseBtn, Rect};
use glam::Vec2;

const MENU_SIZE: f32 = 180.0;
const MENU_MARGIN: f32 = 6.0;
const BUTTON_MARGIN: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct MenuButton {
    pub group: MenuGroup,
    pub rect: Rect,
    main: Vec<TileId>,
    alt: Vec<TileId>,
    index: usize,
    main_active: bool,
}

impl MenuButton {
    fn items(&self) -> &[TileId] {
        if self.main_active || self.alt.is_empty() {
            &self.main
        } else {
            &self.alt
        }
    }

    pub fn current_id(&self) -> TileId {
        let items = self.items();
        items[self.index % items.len()]
    }

    /// Next variant in the active set, wrapping.
    pub fn cycle(&mut self) {
        self.index = (self.index + 1) % self.items().len();
    }

    pub fn toggle_alt(&mut self) {
        if !self.alt.is_empty() {
            self.main_active = !self.main_active;
            self.index %= self.items().len();
        }
    }

    pub fn holds(&self, id: TileId) -> bool {
        self.main.contains(&id) || self.alt.contains(&id)
    }
}

#[derive(Debug, Clone)]
pub struct Menu {
    pub rect: Rect,
    buttons: Vec<MenuButton>,
}

impl Menu {
    pub fn new(catalog: &Catalog, viewport: Vec2) -> Self {
        let rect = Rect::new(
            viewport.x - MENU_SIZE - MENU_MARGIN,
            viewport.y - MENU_SIZE - MENU_MARGIN,
            MENU_SIZE,
            MENU_SIZE,
        );
        let half = Vec2::splat(MENU_SIZE * 0.5);
        let slot = |col: f32, row: f32| {
            Rect::from_pos_size(rect.top_left() + half * Vec2::new(col, row), half)
                .inflated(-BUTTON_MARGIN, -BUTTON_MARGIN)
        };

        let mut buttons = Vec::new();
        for group in MenuGroup::ALL {
            let ids = catalog.menu_ids(group);
            let (main, alt): (Vec<TileId>, Vec<TileId>) = match group {
                MenuGroup::Palm => ids
                    .into_iter()
                    .partition(|id| catalog.style(*id).is_ok_and(|style| style != Style::PalmBg)),
                _ => (ids, Vec::new()),
            };
            if main.is_empty() {
                log::warn!("Menu group {group:?} has no selectable ids, button skipped");
                continue;
            }
            let rect = match group {
                MenuGroup::Terrain => slot(0.0, 0.0),
                MenuGroup::Coin => slot(1.0, 0.0),
                MenuGroup::Enemy => slot(1.0, 1.0),
                MenuGroup::Palm => slot(0.0, 1.0),
            };
            buttons.push(MenuButton {
                group,
                rect,
                main,
                alt,
                index: 0,
                main_active: true,
            });
        }

        Self { rect, buttons }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.rect.contains_point(point)
    }

    pub fn buttons(&self) -> &[MenuButton] {
        &self.buttons
    }

    /// Handles a press inside the menu. Returns the id to select when the
    /// press landed on a button.
    pub fn click(&mut self, point: Vec2, button: MouseBtn) -> Option<TileId> {
        let target = self.buttons.iter_mut().find(|b| b.rect.contains_point(point))?;
        match button {
            MouseBtn::Left => {}
            MouseBtn::Right => target.cycle(),
            MouseBtn::Middle => target.toggle_alt(),
        }
        Some(target.current_id())
    }

    /// Button whose sets contain `id`, for the selection highlight.
    pub fn button_for(&self, id: TileId) -> Option<&MenuButton> {
        self.buttons.iter().find(|b| b.holds(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Menu {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        Menu::new(&catalog, Vec2::new(1280.0, 720.0))
    }

    fn center_of(menu: &Menu, group: MenuGroup) -> Vec2 {
        menu.buttons()
            .iter()
            .find(|b| b.group == group)
            .map(|b| b.rect.center())
            .expect("button exists")
    }

    #[test]
    fn sits_in_bottom_right_corner() {
        let menu = menu();
        assert_eq!(menu.rect, Rect::new(1094.0, 534.0, 180.0, 180.0));
        assert_eq!(menu.buttons().len(), 4);
        assert!(menu.contains(Vec2::new(1200.0, 600.0)));
        assert!(!menu.contains(Vec2::new(100.0, 600.0)));
    }

    #[test]
    fn left_click_selects_and_right_click_cycles() {
        let mut menu = menu();
        let coin = center_of(&menu, MenuGroup::Coin);
        assert_eq!(menu.click(coin, MouseBtn::Left), Some(TileId(4)));
        assert_eq!(menu.click(coin, MouseBtn::Right), Some(TileId(5)));
        assert_eq!(menu.click(coin, MouseBtn::Right), Some(TileId(6)));
        assert_eq!(menu.click(coin, MouseBtn::Right), Some(TileId(4)));
    }

    #[test]
    fn middle_click_swaps_palm_sets() {
        let mut menu = menu();
        let palm = center_of(&menu, MenuGroup::Palm);
        assert_eq!(menu.click(palm, MouseBtn::Right), Some(TileId(12)));
        assert_eq!(menu.click(palm, MouseBtn::Middle), Some(TileId(16)));
        assert_eq!(menu.click(palm, MouseBtn::Middle), Some(TileId(12)));
        // Groups without an alternate set ignore the toggle.
        let terrain = center_of(&menu, MenuGroup::Terrain);
        assert_eq!(menu.click(terrain, MouseBtn::Middle), Some(TileId(2)));
    }

    #[test]
    fn gap_between_buttons_selects_nothing() {
        let mut menu = menu();
        let gap = menu.rect.top_left() + Vec2::new(90.0, 90.0);
        assert!(menu.contains(gap));
        assert_eq!(menu.click(gap, MouseBtn::Left), None);
    }

    #[test]
    fn highlight_finds_owning_button() {
        let menu = menu();
        assert_eq!(
            menu.button_for(TileId(17)).map(|b| b.group),
            Some(MenuGroup::Palm)
        );
        assert_eq!(
            menu.button_for(TileId(9)).map(|b| b.group),
            Some(MenuGroup::Enemy)
        );
        assert!(menu.button_for(TileId(0)).is_none());
    }
}
