use crate::editor::EditorSurface;
use crate::error::EditorError;

/// 拖拽手柄相对图片右下角的偏移
pub const HANDLE_OFFSET: i32 = 8;
/// 宽度必须大于该值才会被应用
pub const MIN_WIDTH: i32 = 50;

/// 编辑区中一张图片的布局信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBox {
    /// 图片在编辑区中的序号
    pub index: usize,
    pub offset_left: i32,
    pub offset_top: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlePosition {
    pub top: i32,
    pub left: i32,
}

impl HandlePosition {
    fn at_corner(image: &ImageBox) -> Self {
        Self {
            top: image.offset_top + image.height - HANDLE_OFFSET,
            left: image.offset_left + image.width - HANDLE_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Image(ImageBox),
    Handle,
    Elsewhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeState {
    Idle,
    Selected {
        image: ImageBox,
    },
    Resizing {
        image: ImageBox,
        start_x: i32,
        start_y: i32,
        start_width: i32,
        start_height: i32,
    },
}

/// 编辑区图片的选中与拖拽缩放
///
/// 选中状态与手柄都只存在于界面中，最终保存的只有写回 [`EditorSurface`]
/// 的 style 宽高。
#[derive(Debug)]
pub struct ImageResizer {
    state: ResizeState,
    handle: Option<HandlePosition>,
    tracking: bool,
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageResizer {
    pub fn new() -> Self {
        Self {
            state: ResizeState::Idle,
            handle: None,
            tracking: false,
        }
    }

    pub fn state(&self) -> ResizeState {
        self.state
    }

    pub fn handle(&self) -> Option<HandlePosition> {
        self.handle
    }

    /// 是否正在监听整个文档的指针移动与抬起
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn selected(&self) -> Option<&ImageBox> {
        match &self.state {
            ResizeState::Idle => None,
            ResizeState::Selected { image } | ResizeState::Resizing { image, .. } => Some(image),
        }
    }

    pub fn click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Image(image) => {
                if self.selected().is_some_and(|current| current.index != image.index) {
                    self.clear();
                }
                self.state = ResizeState::Selected { image };
                self.handle = Some(HandlePosition::at_corner(&image));
            }
            ClickTarget::Handle => {}
            ClickTarget::Elsewhere => self.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.state = ResizeState::Idle;
        self.handle = None;
        self.tracking = false;
    }

    /// 在手柄上按下：记录起点与起始宽度，开始跟踪文档级指针事件
    pub fn pointer_down(&mut self, x: i32, y: i32) -> bool {
        let ResizeState::Selected { image } = self.state else {
            return false;
        };
        self.state = ResizeState::Resizing {
            image,
            start_x: x,
            start_y: y,
            start_width: image.width,
            start_height: image.height,
        };
        self.tracking = true;
        true
    }

    /// 指针移动；新宽度不大于 [`MIN_WIDTH`] 时本次更新被跳过（不截断）
    pub fn pointer_move(&mut self, x: i32, surface: &mut EditorSurface) -> Result<Option<i32>, EditorError> {
        let ResizeState::Resizing {
            mut image,
            start_x,
            start_y,
            start_width,
            start_height,
        } = self.state
        else {
            return Ok(None);
        };

        let new_width = start_width + (x - start_x);
        if new_width <= MIN_WIDTH {
            return Ok(None);
        }

        surface.set_image_width(image.index, new_width)?;
        image.width = new_width;
        image.height = scaled_height(start_width, start_height, new_width);
        self.state = ResizeState::Resizing {
            image,
            start_x,
            start_y,
            start_width,
            start_height,
        };
        self.handle = Some(HandlePosition::at_corner(&image));
        Ok(Some(new_width))
    }

    /// 抬起指针：结束缩放并解除文档级监听，图片保持选中
    pub fn pointer_up(&mut self) {
        if let ResizeState::Resizing { image, .. } = self.state {
            self.state = ResizeState::Selected { image };
        }
        self.tracking = false;
    }
}

fn scaled_height(start_width: i32, start_height: i32, new_width: i32) -> i32 {
    if start_width <= 0 {
        return start_height;
    }
    (i64::from(start_height) * i64::from(new_width) / i64::from(start_width)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(index: usize, width: i32, height: i32) -> ImageBox {
        ImageBox {
            index,
            offset_left: 10,
            offset_top: 20,
            width,
            height,
        }
    }

    fn surface() -> EditorSurface {
        EditorSurface::new(r#"<p>a</p><img src="one.png"><img src="two.png">"#)
    }

    #[test]
    fn clicking_image_selects_and_places_handle() {
        let mut resizer = ImageResizer::new();
        resizer.click(ClickTarget::Image(image(0, 200, 100)));
        assert_eq!(resizer.selected().map(|i| i.index), Some(0));
        assert_eq!(
            resizer.handle(),
            Some(HandlePosition { top: 20 + 100 - 8, left: 10 + 200 - 8 })
        );

        resizer.click(ClickTarget::Handle);
        assert!(resizer.selected().is_some());

        resizer.click(ClickTarget::Elsewhere);
        assert_eq!(resizer.state(), ResizeState::Idle);
        assert_eq!(resizer.handle(), None);
    }

    #[test]
    fn selecting_another_image_moves_selection() {
        let mut resizer = ImageResizer::new();
        resizer.click(ClickTarget::Image(image(0, 200, 100)));
        resizer.click(ClickTarget::Image(ImageBox { offset_left: 300, ..image(1, 50, 50) }));
        assert_eq!(resizer.selected().map(|i| i.index), Some(1));
        assert_eq!(resizer.handle(), Some(HandlePosition { top: 62, left: 342 }));
    }

    #[test]
    fn drag_applies_delta_and_skips_below_floor() {
        let mut resizer = ImageResizer::new();
        let mut surface = surface();
        resizer.click(ClickTarget::Image(image(1, 200, 100)));
        assert!(resizer.pointer_down(500, 300));
        assert!(resizer.is_tracking());

        assert_eq!(resizer.pointer_move(540, &mut surface).unwrap(), Some(240));
        assert_eq!(resizer.selected().map(|i| (i.width, i.height)), Some((240, 120)));
        assert_eq!(resizer.handle(), Some(HandlePosition { top: 20 + 120 - 8, left: 10 + 240 - 8 }));

        // 200 + (330 - 500) = 30，不更新
        assert_eq!(resizer.pointer_move(330, &mut surface).unwrap(), None);
        assert_eq!(resizer.selected().map(|i| i.width), Some(240));
        assert!(surface.html().contains(r#"<img src="two.png" style="width: 240px; height: auto;">"#));

        // 恰好 50 也不应用
        assert_eq!(resizer.pointer_move(350, &mut surface).unwrap(), None);
        assert_eq!(resizer.pointer_move(351, &mut surface).unwrap(), Some(51));

        resizer.pointer_up();
        assert!(!resizer.is_tracking());
        assert!(matches!(resizer.state(), ResizeState::Selected { .. }));
    }

    #[test]
    fn movement_after_release_is_ignored() {
        let mut resizer = ImageResizer::new();
        let mut surface = surface();
        resizer.click(ClickTarget::Image(image(0, 200, 100)));
        resizer.pointer_down(0, 0);
        resizer.pointer_up();

        assert_eq!(resizer.pointer_move(100, &mut surface).unwrap(), None);
        assert!(!surface.html().contains("style="));

        // 再次缩放从新的宽度开始
        resizer.pointer_down(0, 0);
        assert_eq!(resizer.pointer_move(-20, &mut surface).unwrap(), Some(180));
        resizer.pointer_up();
        assert!(!resizer.is_tracking());
    }

    #[test]
    fn pointer_down_without_selection_does_nothing() {
        let mut resizer = ImageResizer::new();
        assert!(!resizer.pointer_down(1, 1));
        assert!(!resizer.is_tracking());
    }
}
