use std::future::Future;

use crate::error::{Error, Result};

/// Páginas vacías seguidas (con `has_more = true`) que se toleran antes de
/// dar la paginación por rota.
pub const MAX_EMPTY_PAGES: usize = 3;

/// Una página de resultados con el flag de continuación del servidor.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

/// Recorre páginas con offsets 0, limit, 2*limit, ... hasta que el
/// servidor diga `has_more = false`.
///
/// Si alguna página falla se devuelve el error y nada más: lo acumulado
/// hasta ese momento se descarta. Una página vacía con `has_more` no corta
/// el recorrido, pero [`MAX_EMPTY_PAGES`] seguidas son error.
pub async fn walk_pages<T, F, Fut>(limit: usize, fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    walk_pages_until(limit, fetch, |_| false).await
}

/// Igual que [`walk_pages`], pero `stop` se evalúa con cada página recién
/// traída (después de acumularla) y, si devuelve true, corta aunque el
/// servidor tenga más páginas.
pub async fn walk_pages_until<T, F, Fut, S>(limit: usize, mut fetch: F, mut stop: S) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
    S: FnMut(&[T]) -> bool,
{
    let mut out = Vec::new();
    let mut offset = 0;
    let mut empty = 0;

    loop {
        let page = fetch(offset).await?;
        let start = out.len();
        out.extend(page.items);

        if stop(&out[start..]) || !page.has_more {
            break;
        }

        empty = if out.len() == start { empty + 1 } else { 0 };
        if empty == MAX_EMPTY_PAGES {
            return Err(Error::StalledPages { offset, pages: empty });
        }
        offset += limit;
    }

    Ok(out)
}
