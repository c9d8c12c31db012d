use ev_core::{AudioChannel, AudioCue, CharacterRef, MoveRoute, PicturePlacement, TransferTarget};

use super::{AudioControl, Flow};
use crate::context::Context;
use crate::host::Request;
use crate::interpreter::Interpreter;
use crate::wait::WaitMode;

fn timed(wait: bool, duration: u32) -> Flow {
    if wait {
        Flow::Suspend(WaitMode::Ticks {
            remaining: duration,
        })
    } else {
        Flow::Continue
    }
}

impl Interpreter {
    pub(super) fn transfer_player(&mut self, target: &TransferTarget, ctx: &mut Context<'_>) -> Flow {
        if ctx.state.in_battle() {
            return Flow::Continue;
        }
        if ctx.host.is_message_busy() {
            return Flow::Yield;
        }
        let (map_id, x, y) = if target.by_variables {
            let map_id = ctx.state.variable(target.map_id);
            (
                u32::try_from(map_id).unwrap_or(0),
                ctx.state.variable(target.x as u32),
                ctx.state.variable(target.y as u32),
            )
        } else {
            (target.map_id, target.x, target.y)
        };
        ctx.host.request(Request::Transfer {
            map_id,
            x,
            y,
            direction: target.direction,
            fade: target.fade,
        });
        Flow::Suspend(WaitMode::Transfer)
    }

    pub(super) fn set_movement_route(
        &mut self,
        character: CharacterRef,
        route: &MoveRoute,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let Some(character) = self.resolve_character(character, ctx) else {
            return Flow::Continue;
        };
        ctx.host.request(Request::MoveRoute {
            character,
            route: route.clone(),
        });
        if route.wait {
            Flow::Suspend(WaitMode::Route { character })
        } else {
            Flow::Continue
        }
    }

    pub(super) fn show_animation(
        &mut self,
        character: CharacterRef,
        animation_id: u32,
        wait: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let Some(character) = self.resolve_character(character, ctx) else {
            return Flow::Continue;
        };
        ctx.host.request(Request::Animation {
            character,
            animation_id,
        });
        if wait {
            Flow::Suspend(WaitMode::Animation { character })
        } else {
            Flow::Continue
        }
    }

    pub(super) fn show_balloon(
        &mut self,
        character: CharacterRef,
        balloon_id: u32,
        wait: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let Some(character) = self.resolve_character(character, ctx) else {
            return Flow::Continue;
        };
        ctx.host.request(Request::Balloon {
            character,
            balloon_id,
        });
        if wait {
            Flow::Suspend(WaitMode::Balloon { character })
        } else {
            Flow::Continue
        }
    }

    pub(super) fn erase_event(&mut self, ctx: &mut Context<'_>) -> Flow {
        let event_id = self.event_id();
        if event_id > 0 && self.is_on_current_map(ctx) {
            ctx.host.request(Request::EraseEvent { event_id });
        }
        Flow::Continue
    }

    pub(super) fn gather_followers(&mut self, ctx: &mut Context<'_>) -> Flow {
        ctx.host.request(Request::GatherFollowers);
        Flow::Suspend(WaitMode::Gather)
    }

    pub(super) fn fade_screen(&mut self, out: bool, ctx: &mut Context<'_>) -> Flow {
        if ctx.host.is_message_busy() {
            return Flow::Yield;
        }
        let duration = self.options.fade_speed;
        let request = if out {
            Request::FadeOut { duration }
        } else {
            Request::FadeIn { duration }
        };
        ctx.host.request(request);
        Flow::Suspend(WaitMode::Ticks {
            remaining: duration,
        })
    }

    pub(super) fn tint_screen(
        &mut self,
        tone: [i32; 4],
        duration: u32,
        wait: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        ctx.host.request(Request::Tint { tone, duration });
        timed(wait, duration)
    }

    pub(super) fn flash_screen(
        &mut self,
        color: [i32; 4],
        duration: u32,
        wait: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        ctx.host.request(Request::Flash { color, duration });
        timed(wait, duration)
    }

    pub(super) fn shake_screen(
        &mut self,
        power: u32,
        speed: u32,
        duration: u32,
        wait: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        ctx.host.request(Request::Shake {
            power,
            speed,
            duration,
        });
        timed(wait, duration)
    }

    pub(super) fn show_picture(
        &mut self,
        picture_id: u32,
        name: &str,
        placement: &PicturePlacement,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let (x, y) = picture_position(placement, ctx);
        ctx.host.request(Request::ShowPicture {
            picture_id,
            name: name.to_string(),
            origin: placement.origin,
            x,
            y,
            scale_x: placement.scale_x,
            scale_y: placement.scale_y,
            opacity: placement.opacity,
            blend_mode: placement.blend_mode,
        });
        Flow::Continue
    }

    pub(super) fn move_picture(
        &mut self,
        picture_id: u32,
        placement: &PicturePlacement,
        duration: u32,
        wait: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let (x, y) = picture_position(placement, ctx);
        ctx.host.request(Request::MovePicture {
            picture_id,
            origin: placement.origin,
            x,
            y,
            scale_x: placement.scale_x,
            scale_y: placement.scale_y,
            opacity: placement.opacity,
            blend_mode: placement.blend_mode,
            duration,
        });
        timed(wait, duration)
    }

    pub(super) fn erase_picture(&mut self, picture_id: u32, ctx: &mut Context<'_>) -> Flow {
        ctx.host.request(Request::ErasePicture { picture_id });
        Flow::Continue
    }

    pub(super) fn set_weather(
        &mut self,
        weather: &str,
        power: i32,
        duration: u32,
        wait: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if ctx.state.in_battle() {
            return Flow::Continue;
        }
        ctx.host.request(Request::Weather {
            weather: weather.to_string(),
            power,
            duration,
        });
        timed(wait, duration)
    }

    pub(super) fn play_audio(
        &mut self,
        channel: AudioChannel,
        cue: &AudioCue,
        ctx: &mut Context<'_>,
    ) -> Flow {
        ctx.host.request(Request::PlayAudio {
            channel,
            cue: cue.clone(),
        });
        Flow::Continue
    }

    pub(super) fn fadeout_audio(
        &mut self,
        channel: AudioChannel,
        seconds: u32,
        ctx: &mut Context<'_>,
    ) -> Flow {
        ctx.host.request(Request::FadeOutAudio { channel, seconds });
        Flow::Continue
    }

    pub(super) fn audio_control(&mut self, control: AudioControl, ctx: &mut Context<'_>) -> Flow {
        let request = match control {
            AudioControl::SaveBgm => Request::SaveBgm,
            AudioControl::ResumeBgm => Request::ResumeBgm,
            AudioControl::StopSe => Request::StopSe,
        };
        ctx.host.request(request);
        Flow::Continue
    }

    pub(super) fn play_movie(&mut self, name: &str, ctx: &mut Context<'_>) -> Flow {
        if ctx.host.is_message_busy() {
            return Flow::Yield;
        }
        if name.is_empty() {
            return Flow::Continue;
        }
        ctx.host.request(Request::PlayMovie {
            name: name.to_string(),
        });
        Flow::Suspend(WaitMode::Video)
    }
}

/// Picture coordinates, read from variables when the placement says so.
fn picture_position(placement: &PicturePlacement, ctx: &Context<'_>) -> (i64, i64) {
    if placement.by_variables {
        (
            ctx.state.variable(placement.x as u32),
            ctx.state.variable(placement.y as u32),
        )
    } else {
        (placement.x, placement.y)
    }
}
