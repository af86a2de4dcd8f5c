use crate::cells::overlay::Rect;

use super::messages::Message;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionLayer {
    Base,
    Overlay,
    ContextMenu,
}

impl InteractionLayer {
    fn priority(self) -> u8 {
        match self {
            Self::Base => 0,
            Self::Overlay => 1,
            Self::ContextMenu => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionKind {
    LeftClick,
    RightClick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionNode {
    pub rect: Rect,
    pub message: Message,
    pub layer: InteractionLayer,
    pub left_clickable: bool,
    pub right_clickable: bool,
}

impl InteractionNode {
    pub fn click(layer: InteractionLayer, rect: Rect, message: Message) -> Self {
        Self {
            rect,
            message,
            layer,
            left_clickable: true,
            right_clickable: false,
        }
    }

    /// Headers answer both buttons: left to act, right for the column menu.
    pub fn header(layer: InteractionLayer, rect: Rect, message: Message) -> Self {
        Self {
            rect,
            message,
            layer,
            left_clickable: true,
            right_clickable: true,
        }
    }

    fn supports(&self, kind: InteractionKind) -> bool {
        match kind {
            InteractionKind::LeftClick => self.left_clickable,
            InteractionKind::RightClick => self.right_clickable,
        }
    }
}

/// Hit regions registered by the renderer for the current frame.
#[derive(Debug, Default, Clone)]
pub struct InteractionMap {
    nodes: Vec<InteractionNode>,
}

impl InteractionMap {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Drops every region on `layer`, e.g. menus that have since closed.
    pub fn clear_layer(&mut self, layer: InteractionLayer) {
        self.nodes.retain(|node| node.layer != layer);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn register(&mut self, node: InteractionNode) {
        self.nodes.push(node);
    }

    pub fn register_click(&mut self, layer: InteractionLayer, rect: Rect, message: Message) {
        self.register(InteractionNode::click(layer, rect, message));
    }

    pub fn register_header(&mut self, layer: InteractionLayer, rect: Rect, message: Message) {
        self.register(InteractionNode::header(layer, rect, message));
    }

    pub fn resolve_message(&self, x: f64, y: f64, kind: InteractionKind) -> Option<Message> {
        self.resolve_node(x, y, kind).map(|node| node.message.clone())
    }

    /// Highest layer wins; within a layer the latest registration wins.
    pub fn resolve_node(&self, x: f64, y: f64, kind: InteractionKind) -> Option<&InteractionNode> {
        let mut best: Option<(usize, &InteractionNode)> = None;
        for (idx, node) in self.nodes.iter().enumerate() {
            if !node.rect.contains(x, y) || !node.supports(kind) {
                continue;
            }
            match best {
                None => best = Some((idx, node)),
                Some((best_idx, best_node)) => {
                    let has_higher_layer = node.layer.priority() > best_node.layer.priority();
                    let same_layer_later_registration =
                        node.layer.priority() == best_node.layer.priority() && idx > best_idx;
                    if has_higher_layer || same_layer_later_registration {
                        best = Some((idx, node));
                    }
                }
            }
        }
        best.map(|(_, node)| node)
    }
}

#[cfg(test)]
mod tests {
    use super::{InteractionKind, InteractionLayer, InteractionMap};
    use crate::app::Message;
    use crate::cells::overlay::Rect;

    #[test]
    fn resolve_prefers_higher_layer() {
        let mut map = InteractionMap::default();
        let rect = Rect::new(10.0, 10.0, 50.0, 20.0);

        map.register_click(InteractionLayer::Base, rect, Message::AddGroup);
        map.register_click(InteractionLayer::ContextMenu, rect, Message::DismissColumnMenu);

        let message = map.resolve_message(11.0, 10.0, InteractionKind::LeftClick);
        assert_eq!(message, Some(Message::DismissColumnMenu));
    }

    #[test]
    fn resolve_prefers_latest_within_same_layer() {
        let mut map = InteractionMap::default();
        let rect = Rect::new(4.0, 4.0, 40.0, 10.0);

        map.register_click(InteractionLayer::Base, rect, Message::DeleteSelected);
        map.register_click(InteractionLayer::Base, rect, Message::DuplicateSelected);

        let message = map.resolve_message(5.0, 4.0, InteractionKind::LeftClick);
        assert_eq!(message, Some(Message::DuplicateSelected));
    }

    #[test]
    fn only_headers_answer_right_click() {
        let mut map = InteractionMap::default();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        map.register_click(InteractionLayer::Base, rect, Message::AddGroup);
        assert_eq!(map.resolve_message(2.0, 2.0, InteractionKind::RightClick), None);

        map.register_header(InteractionLayer::Base, rect, Message::TogglePin("g1".to_string()));
        assert_eq!(
            map.resolve_message(2.0, 2.0, InteractionKind::RightClick),
            Some(Message::TogglePin("g1".to_string()))
        );
    }

    #[test]
    fn points_outside_every_region_resolve_to_nothing() {
        let mut map = InteractionMap::default();
        map.register_click(InteractionLayer::Base, Rect::new(0.0, 0.0, 10.0, 10.0), Message::AddGroup);
        assert_eq!(map.resolve_message(10.0, 5.0, InteractionKind::LeftClick), None);
        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn clearing_a_layer_keeps_the_others() {
        let mut map = InteractionMap::default();
        let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
        map.register_click(InteractionLayer::Base, rect, Message::AddGroup);
        map.register_click(InteractionLayer::Overlay, rect, Message::DeleteSelected);
        assert_eq!(
            map.resolve_message(1.0, 1.0, InteractionKind::LeftClick),
            Some(Message::DeleteSelected)
        );

        map.clear_layer(InteractionLayer::Overlay);
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.resolve_message(1.0, 1.0, InteractionKind::LeftClick),
            Some(Message::AddGroup)
        );
    }
}
