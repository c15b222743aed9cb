use tessera_store::{ChainState, Comment};
use tessera_transactions::{CommentOp, CommentOptionsOp, DeleteCommentOp};
use tessera_types::{AccountName, Asset, Permlink, Timestamp};

use crate::context::ApplyContext;
use crate::LedgerError;

pub fn comment<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &CommentOp,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    let mut author = ctx.account(&op.author)?;

    let parent = if op.is_root() {
        None
    } else {
        let parent = ctx.state.get_comment(&op.parent_author, &op.parent_permlink)?;
        if parent.depth >= ctx.params.max_comment_depth {
            return Err(LedgerError::limit(format!(
                "comment is nested {} posts deep, maximum depth is {}",
                parent.depth, ctx.params.max_comment_depth
            )));
        }
        Some(parent)
    };

    if let Some(mut existing) = ctx.state.find_comment(&op.author, &op.permlink)? {
        if existing.parent_author != op.parent_author
            || existing.parent_permlink != op.parent_permlink
        {
            return Err(LedgerError::illegal("the parent of a comment cannot change"));
        }
        if !op.title.is_empty() {
            existing.title = op.title.clone();
        }
        if !op.body.is_empty() {
            existing.body = op.body.clone();
        }
        if !op.json_metadata.is_empty() {
            existing.json_metadata = op.json_metadata.clone();
        }
        existing.last_update = now;
        existing.active = now;
        ctx.state.put_comment(&existing)?;
        tracing::debug!(author = %op.author, permlink = %op.permlink, "comment edited");
        return Ok(());
    }

    if op.is_root() {
        let allowed_at = author
            .last_root_post
            .plus(ctx.params.min_root_comment_interval_secs);
        if now <= allowed_at {
            return Err(LedgerError::TooSoon {
                what: "root post",
                allowed_at,
            });
        }
        author.last_root_post = now;
    } else {
        let allowed_at = author.last_post.plus(ctx.params.min_reply_interval_secs);
        if now <= allowed_at {
            return Err(LedgerError::TooSoon {
                what: "reply",
                allowed_at,
            });
        }
    }
    author.last_post = now;
    author.post_count = author.post_count.saturating_add(1);
    ctx.state.put_account(&author)?;

    let (root_author, root_permlink, category, depth) = match &parent {
        None => (
            op.author.clone(),
            op.permlink.clone(),
            op.parent_permlink.clone(),
            0,
        ),
        Some(p) => (
            p.root_author.clone(),
            p.root_permlink.clone(),
            p.category.clone(),
            p.depth + 1,
        ),
    };

    ctx.state.create_comment(Comment {
        author: op.author.clone(),
        permlink: op.permlink.clone(),
        parent_author: op.parent_author.clone(),
        parent_permlink: op.parent_permlink.clone(),
        root_author,
        root_permlink,
        category,
        title: op.title.clone(),
        body: op.body.clone(),
        json_metadata: op.json_metadata.clone(),
        created: now,
        last_update: now,
        active: now,
        cashout_time: now.plus(ctx.params.cashout_window_secs),
        last_payout: Timestamp::EPOCH,
        depth,
        children: 0,
        net_rshares: 0,
        abs_rshares: 0,
        vote_rshares: 0,
        children_abs_rshares: 0,
        total_vote_weight: 0,
        net_votes: 0,
        author_rewards: 0,
        total_payout_value: Asset::scr(0),
        curator_payout_value: Asset::scr(0),
        beneficiary_payout_value: Asset::scr(0),
        beneficiaries: Vec::new(),
    })?;

    if let Some(parent) = parent {
        walk_ancestors(ctx, parent, now, 1)?;
    }

    tracing::debug!(
        author = %op.author,
        permlink = %op.permlink,
        root = op.is_root(),
        "comment created"
    );
    Ok(())
}

/// Adjust `children` of `parent` and every ancestor above it.
fn walk_ancestors<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    parent: Comment,
    now: Timestamp,
    delta: i64,
) -> Result<(), LedgerError> {
    let mut next = Some(parent);
    while let Some(mut ancestor) = next {
        ancestor.children = if delta >= 0 {
            ancestor.children.saturating_add(1)
        } else {
            ancestor.children.saturating_sub(1)
        };
        ancestor.active = now;
        ctx.state.put_comment(&ancestor)?;
        next = if ancestor.is_root() {
            None
        } else {
            Some(
                ctx.state
                    .get_comment(&ancestor.parent_author, &ancestor.parent_permlink)?,
            )
        };
    }
    Ok(())
}

pub fn delete_comment<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &DeleteCommentOp,
) -> Result<(), LedgerError> {
    ctx.require_account(&op.author)?;
    let comment = ctx.state.get_comment(&op.author, &op.permlink)?;

    if comment.children > 0 {
        return Err(LedgerError::illegal("cannot delete a comment with replies"));
    }
    if comment.is_paid_out() {
        return Err(LedgerError::illegal("cannot delete a comment after payout"));
    }
    if comment.net_rshares > 0 {
        return Err(LedgerError::illegal(
            "cannot delete a comment with net positive votes",
        ));
    }

    for vote in ctx.state.comment_votes(&op.author, &op.permlink)? {
        ctx.state
            .remove_comment_vote(&vote.author, &vote.permlink, &vote.voter)?;
    }

    if !comment.is_root() {
        let now = ctx.now();
        let parent = ctx
            .state
            .get_comment(&comment.parent_author, &comment.parent_permlink)?;
        walk_ancestors(ctx, parent, now, -1)?;
    }

    ctx.state.remove_comment(&op.author, &op.permlink)?;
    tracing::debug!(author = %op.author, permlink = %op.permlink, "comment deleted");
    Ok(())
}

pub fn comment_options<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &CommentOptionsOp,
) -> Result<(), LedgerError> {
    let mut comment = ctx.state.get_comment(&op.author, &op.permlink)?;

    if !comment.beneficiaries.is_empty() {
        return Err(LedgerError::illegal("comment already has beneficiaries specified"));
    }
    if has_votes(ctx, &op.author, &op.permlink)? || comment.abs_rshares != 0 {
        return Err(LedgerError::illegal(
            "comment must not have been voted on before specifying beneficiaries",
        ));
    }
    for route in &op.beneficiaries {
        ctx.require_account(&route.account)?;
    }

    comment.beneficiaries = op.beneficiaries.clone();
    ctx.state.put_comment(&comment)?;
    tracing::debug!(
        author = %op.author,
        permlink = %op.permlink,
        beneficiaries = op.beneficiaries.len(),
        "beneficiaries set"
    );
    Ok(())
}

fn has_votes<S: ChainState>(
    ctx: &ApplyContext<'_, S>,
    author: &AccountName,
    permlink: &Permlink,
) -> Result<bool, LedgerError> {
    Ok(!ctx.state.comment_votes(author, permlink)?.is_empty())
}
