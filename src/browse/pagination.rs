/// 页码窗口向两侧各延伸的页数
const WINDOW_RADIUS: usize = 2;

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// 取第 `page` 页（从 1 开始）的切片，越界返回空切片
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLink {
    First { disabled: bool },
    Ellipsis,
    Page { number: usize, active: bool },
    Last { page: usize, disabled: bool },
}

/// 把请求的页码收进 `1..=total`；没有内容时固定为第 1 页
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// 分页控件；总页数不超过 1 时不渲染任何内容
pub fn page_controls(current: usize, total: usize) -> Vec<PageLink> {
    if total <= 1 {
        return Vec::new();
    }

    let current = clamp_page(current, total);
    let start = current.saturating_sub(WINDOW_RADIUS).max(1);
    let end = current.saturating_add(WINDOW_RADIUS).min(total);

    let mut links = vec![PageLink::First {
        disabled: current == 1,
    }];
    if start > 1 {
        links.push(PageLink::Ellipsis);
    }
    for number in start..=end {
        links.push(PageLink::Page {
            number,
            active: number == current,
        });
    }
    if end < total {
        links.push(PageLink::Ellipsis);
    }
    links.push(PageLink::Last {
        page: total,
        disabled: current == total,
    });
    links
}
