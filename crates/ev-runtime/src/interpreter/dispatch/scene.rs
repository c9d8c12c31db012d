use ev_core::{CommandKind, CommandTable, ShopGood, TroopSource};
use tracing::debug;

use super::Flow;
use crate::context::Context;
use crate::host::SceneRequest;
use crate::interpreter::{Interpreter, Termination};
use crate::wait::{SceneKind, WaitMode};

impl Interpreter {
    /// Starts a battle scene; the result lands in the branch state at this indent.
    pub(super) fn battle_processing(
        &mut self,
        troop: TroopSource,
        can_escape: bool,
        can_lose: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if ctx.state.in_battle() {
            return Flow::Continue;
        }
        let troop_id = match troop {
            TroopSource::Direct(troop_id) => troop_id,
            TroopSource::Variable(variable_id) => {
                u32::try_from(ctx.state.variable(variable_id)).unwrap_or(0)
            }
            TroopSource::Encounter => ctx.state.encounter_troop_id(),
        };
        if troop_id == 0 || ctx.database.troop(troop_id).is_none() {
            debug!(troop_id, "battle skipped, unknown troop");
            return Flow::Continue;
        }
        ctx.host.push_scene(SceneRequest::Battle {
            troop_id,
            can_escape,
            can_lose,
        });
        Flow::Suspend(WaitMode::Battle {
            indent: self.indent,
        })
    }

    pub(super) fn shop_processing(
        &mut self,
        table: &CommandTable,
        good: ShopGood,
        purchase_only: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if ctx.state.in_battle() {
            return Flow::Continue;
        }
        let mut goods = vec![good];
        while let Some(CommandKind::ShopGoods(next)) =
            table.get(self.cursor + 1).map(|command| &command.kind)
        {
            self.cursor += 1;
            goods.push(*next);
        }
        ctx.host.push_scene(SceneRequest::Shop {
            goods,
            purchase_only,
        });
        Flow::Suspend(WaitMode::Scene {
            scene: SceneKind::Shop,
        })
    }

    pub(super) fn name_input(&mut self, actor_id: u32, max_chars: u32, ctx: &mut Context<'_>) -> Flow {
        if ctx.state.in_battle() || !ctx.state.actor_exists(actor_id) {
            return Flow::Continue;
        }
        ctx.host.push_scene(SceneRequest::NameInput {
            actor_id,
            max_chars,
        });
        Flow::Suspend(WaitMode::Scene {
            scene: SceneKind::NameInput,
        })
    }

    pub(super) fn open_save(&mut self, ctx: &mut Context<'_>) -> Flow {
        if ctx.state.in_battle() {
            return Flow::Continue;
        }
        ctx.host.push_scene(SceneRequest::Save);
        Flow::Suspend(WaitMode::Scene {
            scene: SceneKind::Save,
        })
    }

    pub(super) fn open_menu(&mut self, ctx: &mut Context<'_>) -> Flow {
        if ctx.state.in_battle() {
            return Flow::Continue;
        }
        self.control_transfer(SceneRequest::Menu, ctx)
    }

    pub(super) fn abort_battle(&mut self, ctx: &mut Context<'_>) -> Flow {
        if !ctx.state.in_battle() {
            return Flow::Continue;
        }
        self.control_transfer(SceneRequest::AbortBattle, ctx)
    }

    /// Hands control to another scene and ends this script.
    pub(super) fn control_transfer(&mut self, scene: SceneRequest, ctx: &mut Context<'_>) -> Flow {
        ctx.host.push_scene(scene);
        Flow::Terminate(Termination::ControlTransfer)
    }
}
