use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    OpenPicker,
    NeedHelp,
    ToggleTheme,
    SwitchInterval(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerCommand {
    Up,
    Down,
    Select,
    Close,
    Clear,
    Backspace,
    Input(char),
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Enter => Some(UiCommand::OpenPicker),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'c' => Some(UiCommand::OpenPicker),
            'n' => Some(UiCommand::NeedHelp),
            'o' => Some(UiCommand::ToggleTheme),
            '1' => Some(UiCommand::SwitchInterval("1m")),
            '5' => Some(UiCommand::SwitchInterval("5m")),
            'h' => Some(UiCommand::SwitchInterval("1h")),
            'd' => Some(UiCommand::SwitchInterval("1d")),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_picker_command(key_code: &KeyCode) -> Option<PickerCommand> {
    match key_code {
        KeyCode::Up => Some(PickerCommand::Up),
        KeyCode::Down => Some(PickerCommand::Down),
        KeyCode::Enter => Some(PickerCommand::Select),
        KeyCode::Esc => Some(PickerCommand::Close),
        KeyCode::Delete => Some(PickerCommand::Clear),
        KeyCode::Backspace => Some(PickerCommand::Backspace),
        KeyCode::Char(c) if !c.is_control() => Some(PickerCommand::Input(*c)),
        _ => None,
    }
}
