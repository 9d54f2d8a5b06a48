//! Generic attach/detach at a 1:N edge
//!
//! The child's foreign key is the only stored side of a 1:N edge, so every
//! operation here writes the child (and, on re-parenting, re-saves the old
//! parent). Both helpers are no-ops when the edge is already in the requested
//! state.

use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_db::Repository;
use tracing::debug;

use crate::base::found;

/// Accessor for the child's foreign key to its parent
pub type ForeignKey<C> = fn(&mut C) -> &mut Option<Id>;

/// Point `child_id` at `parent_id`, returning the parent
pub async fn attach<P, C, RP, RC>(
    parents: &RP,
    children: &RC,
    parent_id: Id,
    child_id: Id,
    foreign_key: ForeignKey<C>,
) -> BlResult<P>
where
    P: Entity,
    C: Entity,
    RP: Repository<P> + ?Sized,
    RC: Repository<C> + ?Sized,
{
    let parent = found(parents.find_by_id(parent_id).await?, parent_id)?;
    let mut child = found(children.find_by_id(child_id).await?, child_id)?;

    let previous = *foreign_key(&mut child);
    if previous == Some(parent_id) {
        return Ok(parent);
    }

    let old_parent = match previous {
        Some(old_id) => parents.find_by_id(old_id).await?,
        None => None,
    };

    if let Some(old_parent) = old_parent {
        parents.save(old_parent).await?;
    }

    *foreign_key(&mut child) = Some(parent_id);
    children.save(child).await?;

    debug!(
        parent = P::TYPE_NAME,
        parent_id,
        child = C::TYPE_NAME,
        child_id,
        previous_parent_id = ?previous,
        "attached"
    );
    Ok(parent)
}

/// Clear `child_id`'s link to `parent_id` if, and only if, it points there
pub async fn detach<P, C, RP, RC>(
    parents: &RP,
    children: &RC,
    parent_id: Id,
    child_id: Id,
    foreign_key: ForeignKey<C>,
) -> BlResult<P>
where
    P: Entity,
    C: Entity,
    RP: Repository<P> + ?Sized,
    RC: Repository<C> + ?Sized,
{
    let parent = found(parents.find_by_id(parent_id).await?, parent_id)?;
    let mut child = found(children.find_by_id(child_id).await?, child_id)?;

    let link = foreign_key(&mut child);
    if *link != Some(parent_id) {
        return Ok(parent);
    }
    *link = None;
    children.save(child).await?;

    debug!(
        parent = P::TYPE_NAME,
        parent_id,
        child = C::TYPE_NAME,
        child_id,
        "detached"
    );
    Ok(parent)
}
